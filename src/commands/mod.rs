pub mod collect;
pub mod load_airlines;
pub mod prune;
pub mod web;

pub use collect::handle_collect;
pub use load_airlines::handle_load_airlines;
pub use prune::handle_prune;
pub use web::handle_web;
