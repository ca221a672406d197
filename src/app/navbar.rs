use leptos::{ev::SubmitEvent, prelude::*};
use leptos_router::{components::*, hooks::use_location};
use leptos_use::use_window_scroll;

pub const NAV_ITEMS: [(&str, &str); 6] = [
    ("Home", "/"),
    ("About", "/about"),
    ("Projects", "/projects"),
    ("Skills", "/skills"),
    ("Resume", "/resume"),
    ("Contact", "/contact"),
];

const SCROLLED_AFTER: f64 = 20.0;

fn is_scrolled(scroll_y: f64) -> bool {
    scroll_y > SCROLLED_AFTER
}

fn is_active(pathname: &str, path: &str) -> bool {
    pathname == path
}

fn nav_class(scrolled: bool) -> &'static str {
    if scrolled {
        "fixed w-full z-50 transition-all duration-300 bg-[#0f0f23]/80 backdrop-blur-lg shadow-lg"
    } else {
        "fixed w-full z-50 transition-all duration-300 bg-transparent"
    }
}

#[component]
fn SearchIcon() -> impl IntoView {
    view! {
        <svg class="w-5 h-5" fill="none" stroke="currentColor" viewBox="0 0 24 24">
            <path
                stroke-linecap="round"
                stroke-linejoin="round"
                stroke-width="2"
                d="M21 21l-6-6m2-5a7 7 0 11-14 0 7 7 0 0114 0z"
            />
        </svg>
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let (is_open, set_is_open) = signal(false);
    let (is_search_open, set_is_search_open) = signal(false);
    let (query, set_query) = signal(String::new());
    let (_, scroll_y) = use_window_scroll();
    let pathname = use_location().pathname;

    // the mobile menu closes whenever a link navigates
    Effect::watch(
        move || pathname.get(),
        move |_, _, _| set_is_open(false),
        false,
    );

    let submit_search = move |ev: SubmitEvent| {
        ev.prevent_default();
        log::info!("searching for: {}", query.get_untracked());
        set_is_search_open(false);
        set_query(String::new());
    };

    let search_input = move |class: &'static str| {
        view! {
            <input
                type="text"
                placeholder="Search..."
                class=class
                prop:value=query
                on:input=move |ev| set_query(event_target_value(&ev))
            />
        }
    };

    view! {
        <nav class=move || nav_class(is_scrolled(scroll_y.get()))>
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex items-center justify-between h-20">
                    <div class="flex-shrink-0 nav-logo">
                        <A href="/">
                            <img class="h-12 w-auto" src="/logo.svg" alt="Logo" />
                        </A>
                    </div>

                    <div class="hidden md:flex items-center space-x-8">
                        <form class="relative flex items-center" on:submit=submit_search>
                            <div class=move || {
                                if is_search_open() {
                                    "w-[300px] transition-all duration-300"
                                } else {
                                    "w-10 transition-all duration-300"
                                }
                            }>
                                {move || {
                                    search_input(
                                        if is_search_open() {
                                            "w-full pl-4 pr-10 h-10 bg-[#1a0033]/50 rounded-full outline-none text-white placeholder-gray-400"
                                        } else {
                                            "w-0 h-10 bg-[#1a0033]/50 rounded-full outline-none"
                                        },
                                    )
                                }}
                            </div>
                            <button
                                type="button"
                                on:click=move |_| set_is_search_open.update(|open| *open = !*open)
                                class="absolute right-0 top-0 h-10 w-10 flex items-center justify-center text-white hover:text-purple-400 transition-colors duration-300"
                            >
                                <SearchIcon />
                            </button>
                        </form>

                        {NAV_ITEMS
                            .into_iter()
                            .map(|(name, path)| {
                                let active = move || is_active(&pathname.get(), path);
                                view! {
                                    <A
                                        href=path
                                        attr:class=move || {
                                            if active() {
                                                "relative group text-purple-400"
                                            } else {
                                                "relative group text-white"
                                            }
                                        }
                                    >
                                        <span class="font-orbitron text-sm tracking-wider">{name}</span>
                                        <span class=move || {
                                            if active() {
                                                "nav-underline scale-x-100"
                                            } else {
                                                "nav-underline scale-x-0 group-hover:scale-x-100"
                                            }
                                        }></span>
                                    </A>
                                }
                            })
                            .collect_view()}
                    </div>

                    <button
                        class="md:hidden flex items-center"
                        aria-label="Toggle menu"
                        on:click=move |_| set_is_open.update(|open| *open = !*open)
                    >
                        <div class="relative w-6 h-5">
                            <span class=move || {
                                if is_open() { "burger-bar rotate-45 top-2" } else { "burger-bar top-0" }
                            }></span>
                            <span class=move || {
                                if is_open() { "burger-bar top-2 opacity-0" } else { "burger-bar top-2" }
                            }></span>
                            <span class=move || {
                                if is_open() { "burger-bar -rotate-45 top-2" } else { "burger-bar top-4" }
                            }></span>
                        </div>
                    </button>
                </div>
            </div>

            <Show when=is_open>
                <div class="md:hidden bg-[#0f0f23]/95 backdrop-blur-lg">
                    <div class="px-4 pt-2 pb-6 space-y-4">
                        <form class="relative" on:submit=submit_search>
                            {search_input(
                                "w-full h-10 bg-[#1a0033]/50 rounded-full pl-4 pr-10 text-white placeholder-gray-400 outline-none",
                            )}
                            <button
                                type="submit"
                                class="absolute right-0 top-0 h-10 w-10 flex items-center justify-center text-white"
                            >
                                <SearchIcon />
                            </button>
                        </form>
                        {NAV_ITEMS
                            .into_iter()
                            .map(|(name, path)| {
                                view! {
                                    <A
                                        href=path
                                        attr:class=move || {
                                            if is_active(&pathname.get(), path) {
                                                "block py-2 font-orbitron text-sm tracking-wider text-purple-400"
                                            } else {
                                                "block py-2 font-orbitron text-sm tracking-wider text-white hover:text-purple-400"
                                            }
                                        }
                                    >
                                        {name}
                                    </A>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </Show>
        </nav>
    }
}
