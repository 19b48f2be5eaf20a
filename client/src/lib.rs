mod app;
mod dom;
mod net;
mod persistence;
mod reconcile;
mod render;
mod session;
mod state;
mod surface;
mod util;
mod ws;

pub use app::run;
