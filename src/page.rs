//! Page skeleton - header, location buttons and the output region

use tracing::debug;

use crate::dom::{el, Attrs, Element, Node};
use crate::state::Location;

pub const PAGE_TITLE: &str = "Veðurspá";
pub const MY_LOCATION_LABEL: &str = "Fá veðurspá fyrir minn stað";
pub const OUTPUT_CLASS: &str = "output";

fn location_button(title: &str, on_click: impl Fn() + 'static) -> Element {
    el(
        "li",
        Attrs::new().class("locations__location"),
        [el(
            "button",
            Attrs::new()
                .class("locations__button")
                .on("click", on_click),
            [title],
        )],
    )
}

/// Append the widget to `container` and return its output region.
///
/// One button per location, in order, followed by the "my location"
/// button. The output region starts empty.
pub fn render<S, M>(
    container: &Element,
    locations: &[Location],
    on_search: S,
    on_search_my_location: M,
) -> Element
where
    S: Fn(Location) + Clone + 'static,
    M: Fn() + 'static,
{
    let header = el(
        "header",
        Attrs::new(),
        [el("h1", Attrs::new(), [PAGE_TITLE])],
    );

    let mut buttons: Vec<Element> = locations
        .iter()
        .map(|location| {
            let on_search = on_search.clone();
            let title = location.title.clone();
            let location = location.clone();
            location_button(&title, move || {
                debug!(title = %location.title, "location selected");
                on_search(location.clone());
            })
        })
        .collect();
    buttons.push(location_button(MY_LOCATION_LABEL, on_search_my_location));

    let locations_element = el(
        "div",
        Attrs::new().class("locations"),
        [el("ul", Attrs::new().class("locations__list"), buttons)],
    );

    let output = el("div", Attrs::new().class(OUTPUT_CLASS), Vec::<Node>::new());

    container.append_child(el(
        "main",
        Attrs::new().class("weather"),
        [header, locations_element, output.clone()],
    ));

    output
}
