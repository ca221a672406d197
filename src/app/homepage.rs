use leptos::prelude::*;
use leptos_meta::Title;

use super::background::Animated3DBackground;

const CORE_ABILITIES: [(&str, &str); 4] = [
    ("Frontend Development", "95%"),
    ("UI/UX Design", "88%"),
    ("Animation & GSAP", "92%"),
    ("Three.js & WebGL", "85%"),
];

struct Service {
    icon: &'static str,
    title: &'static str,
    desc: &'static str,
}

const SERVICES: [Service; 4] = [
    Service {
        icon: "💻",
        title: "Web Development",
        desc: "Building responsive, high-performance websites and web apps with modern frameworks.",
    },
    Service {
        icon: "🎨",
        title: "UI/UX Design",
        desc: "Designing intuitive, beautiful interfaces and seamless user experiences.",
    },
    Service {
        icon: "🌀",
        title: "3D & Animation",
        desc: "Creating interactive 3D scenes and smooth animations using Three.js, GSAP, and WebGL.",
    },
    Service {
        icon: "✨",
        title: "Creative Coding",
        desc: "Experimenting with generative art, visual effects, and creative web projects.",
    },
];

pub(super) struct Project {
    pub title: &'static str,
    pub desc: &'static str,
    pub demo: &'static str,
    pub code: &'static str,
}

pub(super) static PROJECTS: [Project; 4] = [
    Project {
        title: "Cosmic Portfolio",
        desc: "An immersive space-themed portfolio showcasing advanced GSAP animations and interactive 3D elements.",
        demo: "#",
        code: "#",
    },
    Project {
        title: "Neural Network Visualizer",
        desc: "Interactive visualization of neural networks with real-time training data and cosmic particle effects.",
        demo: "#",
        code: "#",
    },
    Project {
        title: "Quantum Chat",
        desc: "Real-time chat application with quantum-inspired encryption and stellar UI animations.",
        demo: "#",
        code: "#",
    },
    Project {
        title: "Stellar Music Player",
        desc: "Music player with 3D visualizations and space-themed interface design.",
        demo: "#",
        code: "#",
    },
];

fn scroll_to(id: &'static str) {
    #[cfg(feature = "hydrate")]
    super::browser::scroll_to_section(id);
    #[cfg(not(feature = "hydrate"))]
    let _ = id;
}

#[component]
pub(super) fn ProjectCard(project: &'static Project) -> impl IntoView {
    view! {
        <div class="bg-gradient-to-br from-gray-800/80 to-gray-900/80 border border-white/10 rounded-2xl p-6 flex flex-col items-start shadow-lg hover:scale-105 transition-transform duration-300 text-left">
            <h3 class="text-lg font-semibold text-white mb-2">{project.title}</h3>
            <p class="text-white/70 text-sm mb-4">{project.desc}</p>
            <div class="flex gap-4 mt-auto">
                <a
                    href=project.demo
                    target="_blank"
                    rel="noopener noreferrer"
                    class="bg-blue-600 hover:bg-blue-700 text-white px-4 py-2 rounded-full text-sm font-semibold transition"
                >
                    "Live Demo"
                </a>
                <a
                    href=project.code
                    target="_blank"
                    rel="noopener noreferrer"
                    class="bg-white hover:bg-gray-200 text-blue-700 px-4 py-2 rounded-full text-sm font-semibold transition"
                >
                    "Code"
                </a>
            </div>
        </div>
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <Title text="Home" />
        <section id="home" class="relative min-h-screen flex items-center justify-center overflow-hidden">
            <Animated3DBackground />
            <div class="absolute inset-0 pointer-events-none">
                <div class="absolute top-20 left-10 w-8 h-8 bg-blue-500/20 rounded-full blur-2xl animate-pulse" />
                <div class="absolute bottom-32 right-20 w-12 h-12 bg-pink-500/20 rounded-full blur-2xl animate-pulse" />
                <div class="absolute top-1/2 left-1/2 w-16 h-16 bg-purple-500/10 rounded-full blur-3xl animate-pulse" />
            </div>

            <div class="container mx-auto px-6 text-center relative z-10 pt-32 pb-32">
                <div class="max-w-3xl mx-auto">
                    <h1 class="text-4xl md:text-6xl font-bold mb-6 text-white">
                        "Creative Developer crafting "
                        <span class="text-blue-400">"immersive digital experiences"</span>
                        " in the cosmic void"
                    </h1>
                    <p class="text-lg md:text-2xl text-white/80 mb-4 font-light">
                        "Transforming ideas into interactive realities through code, design, and a touch of cosmic magic. Welcome to my digital universe."
                    </p>
                    <p class="text-base md:text-lg text-white/60 mb-8 italic">
                        "Since 2019, I've been navigating the vast expanse of web development, transforming caffeine into code and ideas into interactive experiences."
                    </p>

                    <div class="flex flex-wrap justify-center gap-4 mb-10">
                        {CORE_ABILITIES
                            .into_iter()
                            .map(|(label, value)| {
                                view! {
                                    <div class="bg-white/10 border border-white/10 rounded-xl px-5 py-3 text-white text-sm md:text-base shadow backdrop-blur">
                                        <span class="font-semibold">{label}</span>
                                        <span class="ml-2 text-blue-300">{value}</span>
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>

                    <div class="mt-16 mb-20">
                        <h2 class="text-2xl md:text-3xl font-bold text-white mb-8">"Services"</h2>
                        <div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-4 gap-8">
                            {SERVICES
                                .iter()
                                .map(|service| {
                                    view! {
                                        <div class="bg-white/10 border border-white/10 rounded-2xl p-6 flex flex-col items-center shadow-lg hover:scale-105 transition-transform duration-300">
                                            <div class="text-4xl mb-4">{service.icon}</div>
                                            <h3 class="text-lg font-semibold text-white mb-2">{service.title}</h3>
                                            <p class="text-white/70 text-sm">{service.desc}</p>
                                        </div>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </div>

                    <div id="projects" class="mt-16 mb-20">
                        <h2 class="text-2xl md:text-3xl font-bold text-white mb-8">"Featured Projects"</h2>
                        <div class="grid grid-cols-1 sm:grid-cols-2 gap-8">
                            {PROJECTS.iter().map(|project| view! { <ProjectCard project /> }).collect_view()}
                        </div>
                    </div>

                    <div class="flex flex-col sm:flex-row gap-6 justify-center items-center mb-12">
                        <button
                            on:click=move |_| scroll_to("projects")
                            class="bg-blue-600 hover:bg-blue-700 text-white px-8 py-4 rounded-full text-lg font-semibold shadow-lg transition"
                        >
                            "Explore Projects"
                        </button>
                        <button
                            on:click=move |_| scroll_to("contact")
                            class="bg-white hover:bg-gray-200 text-blue-700 px-8 py-4 rounded-full text-lg font-semibold shadow-lg transition"
                        >
                            "Get In Touch"
                        </button>
                    </div>

                    <div id="contact" class="mb-12 text-white/80">
                        <h2 class="text-2xl md:text-3xl font-bold text-white mb-4">"Say Hello"</h2>
                        <p class="mb-2">"Have a project in mind or just want to talk shop?"</p>
                        <a href="mailto:hello@mvibe.dev" class="text-blue-300 hover:text-blue-200 underline">
                            "hello@mvibe.dev"
                        </a>
                    </div>

                    <div class="absolute bottom-8 left-1/2 transform -translate-x-1/2 animate-bounce">
                        <div class="w-6 h-10 border-2 border-white/30 rounded-full flex justify-center">
                            <div class="w-1 h-3 bg-white/50 rounded-full mt-2 animate-pulse" />
                        </div>
                    </div>
                </div>
            </div>
        </section>
    }
}
