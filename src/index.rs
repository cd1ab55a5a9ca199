use std::collections::HashMap;

use log::debug;

use crate::{dex::ClassRecord, smali::{self, RenderedClass}};

/// Every rendered class of one loaded package, sorted by name. Never mutated once built.
#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: Vec<RenderedClass>,
    by_name: HashMap<String, usize>,
}

impl ClassIndex {
    /// Render the classes of every section and sort them byte-wise by name.
    /// Duplicate names across sections are all kept.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ClassRecord>,
    {
        let classes = records.into_iter().map(|record| smali::render(&record)).collect();
        Self::from_rendered(classes)
    }

    pub fn from_rendered(mut classes: Vec<RenderedClass>) -> Self {
        classes.sort_by(|a, b| a.class_name.as_bytes().cmp(b.class_name.as_bytes()));
        let mut by_name = HashMap::with_capacity(classes.len());
        for (i, class) in classes.iter().enumerate() {
            by_name.entry(class.class_name.clone()).or_insert(i);
        }
        debug!("Indexed {} classes", classes.len());
        Self { classes, by_name }
    }

    /// Keep only the classes whose name starts with `prefix`
    pub fn retain_prefix(self, prefix: &str) -> Self {
        let classes = self
            .classes
            .into_iter()
            .filter(|c| c.class_name.starts_with(prefix))
            .collect();
        Self::from_rendered(classes)
    }

    pub fn classes(&self) -> &[RenderedClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes whose name or any method name contains `query`, ignoring case, in index order.
    /// A blank query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&RenderedClass> {
        let query = query.trim();
        if query.is_empty() {
            return self.classes.iter().collect();
        }
        let needle = query.to_lowercase();
        let matches = |s: &str| s.to_lowercase().contains(&needle);
        self.classes
            .iter()
            .filter(|c| matches(&c.class_name) || c.method_names.iter().any(|m| matches(m)))
            .collect()
    }

    /// Exact name lookup. With duplicate names the first in index order wins.
    pub fn resolve_by_name(&self, name: &str) -> Option<&RenderedClass> {
        self.by_name.get(name).map(|&i| &self.classes[i])
    }
}
