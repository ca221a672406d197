use leptos::prelude::*;
use leptos_meta::Title;

use super::homepage::{ProjectCard, PROJECTS};

#[component]
fn PageSection(title: &'static str, children: Children) -> impl IntoView {
    view! {
        <Title text=title />
        <section class="max-w-5xl mx-auto pt-32 pb-16 px-6 text-white">
            <h1 class="font-orbitron font-bold text-3xl md:text-4xl text-center mb-10">{title}</h1>
            {children()}
        </section>
    }
}

#[component]
pub fn AboutPage() -> impl IntoView {
    view! {
        <PageSection title="About">
            <div class="max-w-3xl mx-auto space-y-4 text-white/80 text-lg leading-relaxed">
                <p>
                    "I'm a creative developer who loves the space where engineering meets motion design. "
                    "Most of my work lives in the browser: interactive scenes, playful interfaces and tools that feel alive."
                </p>
                <p>
                    "When I'm not coding, I'm sketching shader ideas, collecting glTF models, or chasing the night sky with a camera."
                </p>
            </div>
        </PageSection>
    }
}

#[component]
pub fn ProjectsPage() -> impl IntoView {
    view! {
        <PageSection title="Projects">
            <div class="grid grid-cols-1 sm:grid-cols-2 gap-8">
                {PROJECTS.iter().map(|project| view! { <ProjectCard project /> }).collect_view()}
            </div>
        </PageSection>
    }
}

const SKILLS: [(&str, u8); 6] = [
    ("Rust & WebAssembly", 80),
    ("TypeScript", 92),
    ("WebGL & GLSL", 85),
    ("Animation", 92),
    ("UI/UX Design", 88),
    ("Tailwind CSS", 90),
];

#[component]
pub fn SkillsPage() -> impl IntoView {
    view! {
        <PageSection title="Skills">
            <div class="max-w-2xl mx-auto space-y-5">
                {SKILLS
                    .into_iter()
                    .map(|(name, level)| {
                        view! {
                            <div>
                                <div class="flex justify-between mb-1 text-sm">
                                    <span class="font-semibold">{name}</span>
                                    <span class="text-blue-300">{format!("{level}%")}</span>
                                </div>
                                <div class="h-2 rounded-full bg-white/10">
                                    <div
                                        class="h-2 rounded-full bg-gradient-to-r from-blue-500 to-teal-300"
                                        style:width=format!("{level}%")
                                    ></div>
                                </div>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </PageSection>
    }
}

#[component]
pub fn ContactPage() -> impl IntoView {
    view! {
        <PageSection title="Contact">
            <div class="max-w-xl mx-auto text-center space-y-4 text-white/80">
                <p>"Open to freelance work, collaborations and interesting conversations."</p>
                <a
                    href="mailto:hello@mvibe.dev"
                    class="inline-block bg-blue-600 hover:bg-blue-700 text-white px-8 py-4 rounded-full text-lg font-semibold shadow-lg transition"
                >
                    "hello@mvibe.dev"
                </a>
            </div>
        </PageSection>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="py-8 text-center text-sm text-white/50">
            <p>{format!("© {} MVIBE. Crafted among the stars.", env!("SITE_BUILD_YEAR"))}</p>
            <p class="mt-1">"Last built " {env!("SITE_BUILD_DATE")}</p>
        </footer>
    }
}
