use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use js_sys::{Function, Promise, Uint8Array};
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlImageElement, Response, ScrollBehavior, ScrollIntoViewOptions};

use crate::assets::{AssetError, AssetSource};
use crate::choreography::scroll_progress;
use crate::preload::{PreloadError, PreloadHost, PreloadState};

fn js_reason(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn browser_window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

/// Wraps a callback-style browser API in a promise resolved by that callback.
async fn resolve_with(schedule: impl Fn(&Function) -> Result<(), JsValue>) -> Result<(), JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        if let Err(err) = schedule(&resolve) {
            let _ = reject.call1(&JsValue::UNDEFINED, &err);
        }
    });
    JsFuture::from(promise).await.map(|_| ())
}

async fn timeout(duration: Duration) -> Result<(), JsValue> {
    let millis = duration.as_millis().min(i32::MAX as u128) as i32;
    resolve_with(|resolve| {
        browser_window()?.set_timeout_with_callback_and_timeout_and_arguments_0(resolve, millis)?;
        Ok(())
    })
    .await
}

async fn animation_frame() -> Result<(), JsValue> {
    resolve_with(|resolve| {
        browser_window()?.request_animation_frame(resolve)?;
        Ok(())
    })
    .await
}

/// Drives the preload sequence against the live document.
pub struct BrowserPreloadHost {
    state: RwSignal<PreloadState>,
    mounted: Arc<AtomicBool>,
}

impl BrowserPreloadHost {
    pub fn new(state: RwSignal<PreloadState>, mounted: Arc<AtomicBool>) -> Self {
        Self { state, mounted }
    }
}

impl PreloadHost for BrowserPreloadHost {
    type Image = HtmlImageElement;

    fn now(&self) -> Duration {
        let millis = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_default();
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }

    async fn sleep(&self, duration: Duration) -> Result<(), PreloadError> {
        timeout(duration)
            .await
            .map_err(|e| PreloadError::Scheduler(js_reason(&e)))
    }

    async fn load_fonts(&self, families: &[String]) -> Result<(), PreloadError> {
        let fail = |e: JsValue| PreloadError::Fonts(js_reason(&e));
        let fonts = document().fonts();
        for family in families {
            let loading = fonts.load(&format!("1em {family}")).map_err(fail)?;
            JsFuture::from(loading).await.map_err(fail)?;
        }
        Ok(())
    }

    fn images(&self) -> Result<Vec<HtmlImageElement>, PreloadError> {
        let found = document()
            .query_selector_all("img")
            .map_err(|e| PreloadError::Images(js_reason(&e)))?;
        Ok((0..found.length())
            .filter_map(|i| found.item(i))
            .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
            .collect())
    }

    async fn settle_image(&self, image: &HtmlImageElement) {
        if image.complete() {
            return;
        }
        let settled = resolve_with(|resolve| {
            image.set_onload(Some(resolve));
            image.set_onerror(Some(resolve));
            Ok(())
        })
        .await;
        image.set_onload(None);
        image.set_onerror(None);
        if let Err(err) = settled {
            log::debug!("image wait interrupted: {}", js_reason(&err));
        }
    }

    async fn next_frame(&self) -> Result<(), PreloadError> {
        animation_frame()
            .await
            .map_err(|e| PreloadError::Scheduler(js_reason(&e)))
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Relaxed)
    }

    fn publish(&self, state: PreloadState) {
        self.state.try_set(state);
    }
}

/// Fetches model files over HTTP from the site's own origin.
pub struct FetchSource;

impl AssetSource for FetchSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let fail = |e: JsValue| AssetError::Fetch {
            url: url.to_string(),
            reason: js_reason(&e),
        };
        let window = browser_window().map_err(fail)?;
        let response: Response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(fail)?
            .dyn_into()
            .map_err(fail)?;
        if !response.ok() {
            return Err(AssetError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let buffer = JsFuture::from(response.array_buffer().map_err(fail)?)
            .await
            .map_err(fail)?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// Current page scroll as a fraction of the scrollable height.
pub fn page_scroll_progress() -> f32 {
    let Some(window) = web_sys::window() else {
        return 0.0;
    };
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let viewport = window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0);

    let mut heights = Vec::with_capacity(5);
    if let Some(document) = window.document() {
        if let Some(body) = document.body() {
            heights.push(body.scroll_height() as f64);
            heights.push(body.offset_height() as f64);
        }
        if let Some(root) = document.document_element() {
            heights.push(root.client_height() as f64);
            heights.push(root.scroll_height() as f64);
            if let Ok(root) = root.dyn_into::<HtmlElement>() {
                heights.push(root.offset_height() as f64);
            }
        }
    }
    scroll_progress(scroll_y, viewport, &heights)
}

pub fn scroll_to_section(id: &str) {
    let Some(target) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
    else {
        log::debug!("no section #{id} to scroll to");
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    target.scroll_into_view_with_scroll_into_view_options(&options);
}
