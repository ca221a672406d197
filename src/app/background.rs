use leptos::{html, prelude::*};

#[cfg(feature = "hydrate")]
use crate::choreography::Choreographer;
#[cfg(feature = "hydrate")]
use super::gl::IconRenderer;

#[cfg(feature = "hydrate")]
struct IconScene {
    choreographer: Choreographer,
    renderer: IconRenderer,
}

#[cfg(feature = "hydrate")]
impl IconScene {
    fn frame(&mut self, scroll: f32, delta: f32) {
        let frames = self.choreographer.frame(scroll, delta);
        let items = self.choreographer.draw_list(&frames);
        if let Err(err) = self.renderer.render(items) {
            log::error!("icon scene render failed: {err}");
        }
    }
}

/// Full-viewport canvas of floating icons that drift as the page scrolls.
#[component]
pub fn Animated3DBackground() -> impl IntoView {
    let canvas_ref = NodeRef::<html::Canvas>::new();

    #[cfg(feature = "hydrate")]
    {
        use leptos::{ev, task::spawn_local};
        use leptos_use::{
            use_event_listener_with_options, use_raf_fn, use_window, UseEventListenerOptions,
        };

        use super::browser::{page_scroll_progress, FetchSource};
        use crate::assets::GLOBAL_MODEL_CACHE;
        use crate::config::SITE_CONFIG;

        let scroll = RwSignal::new(0.0_f32);
        // dropped with the component, which stops every icon's clips
        let scene = StoredValue::new_local(None::<IconScene>);

        let _ = use_event_listener_with_options(
            use_window(),
            ev::scroll,
            move |_| scroll.set(page_scroll_progress()),
            UseEventListenerOptions::default().passive(true),
        );

        Effect::new(move |_| {
            let Some(canvas) = canvas_ref.get() else {
                return;
            };
            scroll.set(page_scroll_progress());
            let config = &*SITE_CONFIG;
            let renderer = match IconRenderer::new(&canvas, config.camera.clone()) {
                Ok(renderer) => renderer,
                Err(err) => {
                    log::error!("3D background disabled: {err}");
                    return;
                }
            };
            scene.set_value(Some(IconScene {
                choreographer: Choreographer::new(&config.icons),
                renderer,
            }));

            for (index, spec) in config.icons.iter().enumerate() {
                let url = spec.asset_ref().to_string();
                spawn_local(async move {
                    // failures are logged by the cache; the icon just stays hidden
                    let Ok(asset) = GLOBAL_MODEL_CACHE.load(&url, &FetchSource).await else {
                        return;
                    };
                    scene.try_update_value(|scene| {
                        if let Some(scene) = scene {
                            scene.choreographer.attach(index, asset.instantiate());
                        }
                    });
                });
            }
        });

        let _ = use_raf_fn(move |args| {
            let delta = (args.delta / 1000.0) as f32;
            let scroll = scroll.get_untracked();
            scene.try_update_value(|scene| {
                if let Some(scene) = scene {
                    scene.frame(scroll, delta);
                }
            });
        });
    }

    view! {
        <div class="absolute inset-x-0 h-full -z-10 pointer-events-none">
            <canvas node_ref=canvas_ref class="fixed top-0 left-0 w-full h-screen" />
        </div>
    }
}
