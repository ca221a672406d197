use leptos::prelude::*;
use leptos_meta::Title;

struct Role {
    title: &'static str,
    place: &'static str,
    dates: &'static str,
    points: &'static [&'static str],
}

const ROLES: [Role; 3] = [
    Role {
        title: "Creative Frontend Developer",
        place: "Freelance",
        dates: "2022 - Present",
        points: &[
            "Interactive 3D landing pages built on WebGL with scroll-driven choreography",
            "Motion design systems shared across client projects",
        ],
    },
    Role {
        title: "UI Engineer",
        place: "Studio Nebula",
        dates: "2020 - 2022",
        points: &[
            "Shipped animated marketing sites for product launches",
            "Cut first paint time in half by reworking asset preloading",
        ],
    },
    Role {
        title: "Web Developer",
        place: "Independent",
        dates: "2019 - 2020",
        points: &["Responsive sites and small web apps for local businesses"],
    },
];

const SKILL_LINES: [(&str, &str); 3] = [
    ("Frontend", "TypeScript, React, Rust, WebAssembly, Leptos, Tailwind CSS"),
    ("Graphics", "WebGL, Three.js, GLSL, glTF pipelines, GSAP"),
    ("Design", "Figma, motion prototyping, design systems"),
];

#[component]
pub fn ResumePage() -> impl IntoView {
    view! {
        <Title text="Resume" />
        <section class="max-w-4xl mx-auto pt-32 pb-16 px-6">
            <h1 class="font-orbitron font-bold text-3xl text-center text-white mb-8">"Resume"</h1>
            <div
                id="resume"
                class="grid grid-cols-1 md:grid-cols-3 gap-6 p-8 bg-white/5 border border-white/10 rounded-2xl text-white/90 leading-snug shadow-2xl"
            >
                <Sidebar />
                <Experience />
            </div>
        </section>
    }
}

#[component]
fn Sidebar() -> impl IntoView {
    view! {
        <div class="space-y-4">
            <div class="text-center">
                <h2 class="text-2xl font-bold">"MVIBE"</h2>
                <p class="text-sm text-white/60">"Creative Developer"</p>
            </div>
            <section class="grid">
                <h3 class="mb-2 border-b border-white/20 pb-0.5 font-bold">"Skills"</h3>
                {SKILL_LINES
                    .into_iter()
                    .map(|(group, list)| {
                        view! {
                            <div class="space-y-1 mb-3">
                                <h4 class="font-semibold text-blue-300">{group}</h4>
                                <p class="text-sm">{list}</p>
                            </div>
                        }
                    })
                    .collect_view()}
            </section>
        </div>
    }
}

#[component]
fn Experience() -> impl IntoView {
    view! {
        <div class="md:col-span-2 space-y-4">
            <section>
                <h3 class="mb-2 border-b border-white/20 pb-0.5 font-bold">"Experience"</h3>
                {ROLES
                    .iter()
                    .map(|role| {
                        view! {
                            <div class="mb-4">
                                <div class="flex items-start justify-between">
                                    <div class="text-left">
                                        <strong>{role.title}</strong>
                                        <div class="text-white/60">{role.place}</div>
                                    </div>
                                    <div class="shrink-0 font-bold">{role.dates}</div>
                                </div>
                                <ul class="list-disc ml-5 text-sm mt-1">
                                    {role.points.iter().map(|point| view! { <li>{*point}</li> }).collect_view()}
                                </ul>
                            </div>
                        }
                    })
                    .collect_view()}
            </section>
        </div>
    }
}
