mod fold_box_layers;
pub use fold_box_layers::fold_layers;
mod never;
pub use never::never;
mod path;
pub use path::{path_matches_prefix, PathIter};
mod with_length;
pub use with_length::with_length;
mod x_forwarded_for;
pub use x_forwarded_for::{x_forwarded_for, X_FORWARDED_FOR};
