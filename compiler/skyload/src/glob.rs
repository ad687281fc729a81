//! `glob()` over a package directory.
//!
//! Patterns are `/`-separated. `*` and `?` match within one path segment,
//! `**` matches any number of segments. The walk does not descend into
//! subpackages: a directory holding its own build file belongs to them.

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use sky_eval::Globber;

use crate::fs::FileSystem;

pub struct FsGlobber {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    build_file_name: String,
}

impl FsGlobber {
    pub fn new(fs: Arc<dyn FileSystem>, root: PathBuf, build_file_name: impl Into<String>) -> Self {
        FsGlobber {
            fs,
            root,
            build_file_name: build_file_name.into(),
        }
    }

    /// Every file and directory under the root, relative to it, skipping
    /// subpackages.
    fn walk(&self) -> io::Result<Vec<(String, bool)>> {
        let mut found = Vec::new();
        let mut pending = vec![String::new()];
        while let Some(relative) = pending.pop() {
            let dir = if relative.is_empty() {
                self.root.clone()
            } else {
                self.root.join(&relative)
            };
            let entries = match self.fs.list_dir(&dir) {
                Ok(entries) => entries,
                Err(error) if error.kind() == io::ErrorKind::NotFound && relative.is_empty() => {
                    return Ok(found);
                }
                Err(error) => return Err(error),
            };
            for entry in entries {
                let path = if relative.is_empty() {
                    entry.name
                } else {
                    format!("{relative}/{}", entry.name)
                };
                if entry.is_dir {
                    if self.fs.exists(&self.root.join(&path).join(&self.build_file_name)) {
                        continue;
                    }
                    pending.push(path.clone());
                }
                found.push((path, entry.is_dir));
            }
        }
        Ok(found)
    }
}

impl Globber for FsGlobber {
    fn glob(
        &self,
        include: &[String],
        exclude: &[String],
        exclude_directories: bool,
    ) -> io::Result<Vec<String>> {
        let include: Vec<Vec<&str>> = include.iter().map(|p| split_pattern(p)).collect();
        let exclude: Vec<Vec<&str>> = exclude.iter().map(|p| split_pattern(p)).collect();

        let mut matched = BTreeSet::new();
        for (path, is_dir) in self.walk()? {
            if is_dir && exclude_directories {
                continue;
            }
            let segments: Vec<&str> = path.split('/').collect();
            let included = include.iter().any(|p| matches_segments(p, &segments));
            if included && !exclude.iter().any(|p| matches_segments(p, &segments)) {
                matched.insert(path);
            }
        }
        tracing::trace!(root = %self.root.display(), matched = matched.len(), "glob");
        Ok(matched.into_iter().collect())
    }
}

fn split_pattern(pattern: &str) -> Vec<&str> {
    pattern.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether `path` segments match `pattern` segments.
pub(crate) fn matches_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| matches_segments(rest, &path[skip..])),
        Some((first, rest)) => match path.split_first() {
            Some((segment, path_rest)) => {
                matches_segment(first, segment) && matches_segments(rest, path_rest)
            }
            None => false,
        },
    }
}

/// Match one segment against a pattern with `*` and `?`.
pub(crate) fn matches_segment(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    // Last `*` seen and the text position it was tried at.
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests;
