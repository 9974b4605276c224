//! Veðurspá - forecast widget drawn in the terminal
//!
//! The library holds the element tree, the view renderer, the search flow
//! and the terminal host pieces; `main` wires them to a live terminal.

pub mod action;
pub mod api;
pub mod components;
pub mod dom;
pub mod effect;
pub mod error;
pub mod geolocation;
pub mod page;
pub mod reducer;
pub mod search;
pub mod state;
pub mod view;
