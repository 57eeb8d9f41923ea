#[derive(Debug)]
pub struct PathIter<'a> {
    inner: std::str::Split<'a, char>,
}

impl<'a> PathIter<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            inner: path.trim_start_matches('/').split('/'),
        }
    }
}

impl<'a> Iterator for PathIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Check whether `path` lies under `prefix`, comparing whole segments.
///
/// `/Proiect_TW/courses` matches `/Proiect_TW/courses` and `/Proiect_TW/courses/7`,
/// but not `/Proiect_TW/coursesX`. Empty segments from repeated or trailing slashes are ignored.
pub fn path_matches_prefix(path: &str, prefix: &str) -> bool {
    let mut path = PathIter::new(path).filter(|s| !s.is_empty());
    PathIter::new(prefix).filter(|s| !s.is_empty()).all(|expected| path.next() == Some(expected))
}
