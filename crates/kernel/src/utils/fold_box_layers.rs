use crate::{ArcHyperService, BoxLayer};

/// Wrap `inner` with `layers`, the first layer becomes the outermost one.
pub fn fold_layers<'a>(layers: impl Iterator<Item = &'a BoxLayer> + std::iter::DoubleEndedIterator, mut inner: ArcHyperService) -> ArcHyperService {
    for l in layers.rev() {
        inner = l.layer_shared(inner);
    }
    inner
}
