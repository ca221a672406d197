use leptos::{html, prelude::*};

use crate::intro::{letter_frame, logo_frame, LETTERS};
use crate::preload::PreloadState;

/// Outline path and offset of each letter in the 500x300 logo.
const LETTER_PATHS: [(&str, &str); 5] = [
    (
        "M 50 250 L 50 80 L 90 80 L 120 180 L 150 80 L 190 80 L 190 250 L 160 250 L 160 140 L 135 230 L 105 230 L 80 140 L 80 250 Z",
        "",
    ),
    (
        "M 220 80 L 250 80 L 280 200 L 310 80 L 340 80 L 300 250 L 260 250 Z",
        "",
    ),
    (
        "M 360 80 L 420 80 L 420 110 L 405 110 L 405 220 L 420 220 L 420 250 L 360 250 L 360 220 L 375 220 L 375 110 L 360 110 Z",
        "",
    ),
    (
        "M 50 80 L 120 80 Q 140 80 140 100 Q 140 120 125 130 Q 145 140 145 165 Q 145 190 120 190 L 50 190 Z M 80 110 L 80 120 L 110 120 Q 115 120 115 115 Q 115 110 110 110 Z M 80 140 L 80 160 L 115 160 Q 120 160 120 150 Q 120 140 115 140 Z",
        "translate(390, 80)",
    ),
    (
        "M 50 80 L 130 80 L 130 110 L 80 110 L 80 150 L 120 150 L 120 180 L 80 180 L 80 220 L 130 220 L 130 250 L 50 250 Z",
        "translate(440, 0)",
    ),
];

/// Starts the preload sequence once the app hydrates and exposes its state.
///
/// On the server, and until hydration, the state stays at 0% and loading.
pub fn use_preloader() -> Signal<PreloadState> {
    let state = RwSignal::new(PreloadState::default());

    #[cfg(feature = "hydrate")]
    {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        use leptos::task::spawn_local;

        use super::browser::BrowserPreloadHost;
        use crate::config::SITE_CONFIG;
        use crate::preload::PreloadSequencer;

        let mounted = Arc::new(AtomicBool::new(true));
        on_cleanup({
            let mounted = Arc::clone(&mounted);
            move || mounted.store(false, Ordering::Relaxed)
        });

        // no tracked reads, so this runs once after hydration
        Effect::new(move |_| {
            let host = BrowserPreloadHost::new(state, Arc::clone(&mounted));
            spawn_local(async move {
                let mut sequencer = PreloadSequencer::new(SITE_CONFIG.preload.clone());
                sequencer.run(&host).await;
            });
        });
    }

    state.into()
}

#[component]
pub fn PreLoader(state: Signal<PreloadState>) -> impl IntoView {
    move || state.get().is_loading.then(|| view! { <PreloaderScreen state /> })
}

#[component]
fn PreloaderScreen(state: Signal<PreloadState>) -> impl IntoView {
    let canvas_ref = NodeRef::<html::Canvas>::new();
    // milliseconds since the screen mounted
    let clock = RwSignal::new(0.0_f32);

    #[cfg(feature = "hydrate")]
    {
        use leptos_use::use_raf_fn;

        use super::gl::ParticleRenderer;
        use crate::particles::{ParticleField, PARTICLE_COUNT};

        let stars = StoredValue::new_local(None::<(ParticleField, ParticleRenderer)>);

        Effect::new(move |_| {
            let Some(canvas) = canvas_ref.get() else {
                return;
            };
            let seed = js_sys::Date::now() as u64;
            let field = ParticleField::generate(PARTICLE_COUNT, seed);
            match ParticleRenderer::new(&canvas, &field) {
                Ok(renderer) => stars.set_value(Some((field, renderer))),
                Err(err) => log::warn!("preloader particles disabled: {err}"),
            }
        });

        let _ = use_raf_fn(move |args| {
            clock.update(|t| *t += args.delta as f32);
            stars.try_update_value(|stars| {
                if let Some((field, renderer)) = stars {
                    field.tick(js_sys::Date::now());
                    renderer.render(field);
                }
            });
        });
    }

    let progress = move || state.get().progress;
    let logo = Memo::new(move |_| logo_frame(clock.get()));

    let letters = LETTERS
        .iter()
        .zip(LETTER_PATHS)
        .enumerate()
        .map(|(index, (letter, (path, offset)))| {
            let frame = Memo::new(move |_| letter_frame(index, clock.get()));
            view! {
                <g class=format!("letter letter-{}", letter.to_ascii_lowercase())>
                    <path
                        class="letter-outline"
                        d=path
                        transform=offset
                        pathLength="1"
                        stroke-dasharray="1"
                        stroke-dashoffset=move || frame.get().dash_offset.to_string()
                        opacity=move || frame.get().outline_opacity.to_string()
                    />
                    <path
                        class="letter-fill"
                        d=path
                        transform=offset
                        opacity=move || frame.get().fill_opacity.to_string()
                    />
                </g>
            }
        })
        .collect_view();

    view! {
        <div class="preloader-container">
            <canvas node_ref=canvas_ref class="preloader-particles" />
            <div class="bg-pulse"></div>
            <div class="logo-container">
                <img
                    src="/logo.svg"
                    alt="Logo"
                    class="preloader-logo"
                    style:opacity=move || logo.get().opacity.to_string()
                    style:transform=move || logo.get().css_transform()
                />
                <svg
                    class="mvibe-logo"
                    width="500"
                    height="300"
                    viewBox="0 0 500 300"
                    xmlns="http://www.w3.org/2000/svg"
                >
                    {letters}
                </svg>
                <div class="loading-bar-container">
                    <div class="loading-bar-outer"></div>
                    <div class="loading-bar-inner" style:width=move || format!("{}%", progress())></div>
                    <div class="loading-percentage">{move || format!("{}%", progress())}</div>
                </div>
            </div>
        </div>
    }
}
