mod background;
#[cfg(feature = "hydrate")]
mod browser;
#[cfg(feature = "hydrate")]
mod gl;
mod homepage;
mod navbar;
mod pages;
mod preloader;
mod resume;

use homepage::HomePage;
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{components::*, path};
use navbar::Navbar;
use pages::{AboutPage, ContactPage, Footer, ProjectsPage, SkillsPage};
use preloader::{use_preloader, PreLoader};
use resume::ResumePage;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <meta name="color-scheme" content="dark" />
                <link rel="icon" type="image/svg+xml" href="/logo.svg" />
                <link rel="stylesheet" id="leptos" href="/pkg/mvibe-site.css" />
                <MetaTags />
            </head>
            <body class="bg-[#0f0f23] text-white font-sans">
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let preload = use_preloader();

    view! {
        <Title formatter=|title| format!("MVIBE - {title}") />

        <Router>
            <PreLoader state=preload />
            // content stays mounted underneath the preloader and fades in once it finishes
            <div class=move || {
                if preload.get().is_loading {
                    "content-wrapper opacity-0"
                } else {
                    "content-wrapper opacity-100"
                }
            }>
                <Navbar />
                <main class="flex flex-col flex-grow w-full">
                    <Routes fallback=|| "Page not found.".into_view()>
                        <Route path=path!("/") view=HomePage />
                        <Route path=path!("/about") view=AboutPage />
                        <Route path=path!("/projects") view=ProjectsPage />
                        <Route path=path!("/skills") view=SkillsPage />
                        <Route path=path!("/resume") view=ResumePage />
                        <Route path=path!("/contact") view=ContactPage />
                    </Routes>
                </main>
                <Footer />
            </div>
        </Router>
    }
}
