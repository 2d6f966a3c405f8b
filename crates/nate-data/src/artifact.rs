//! Named data artifacts and the per-session store that holds them.

use std::collections::HashMap;

use nate_common::ToolError;

use crate::table::Table;

/// A named table that tools can create and reference.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArtifact {
    name: String,
    table: Table,
}

impl DataArtifact {
    pub fn new(name: impl Into<String>, table: Table) -> Result<Self, ToolError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ToolError::InvalidArgument {
                name: "name".into(),
                reason: "artifact name must not be empty".into(),
            });
        }
        Ok(Self { name, table })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// One-line description used to brief the model without sending rows.
    pub fn summarize(&self) -> String {
        let columns: Vec<String> = self
            .table
            .column_names()
            .into_iter()
            .map(|c| format!("'{c}'"))
            .collect();
        format!(
            "{} is a table with {} rows and the following columns: [{}]",
            self.name,
            self.table.row_count(),
            columns.join(", ")
        )
    }
}

/// Artifacts keyed by name, iterated in first-insertion order.
///
/// Inserting under an existing name replaces the artifact in place. There is
/// no removal: artifacts live as long as the session.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    artifacts: Vec<DataArtifact>,
    index: HashMap<String, usize>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `artifact`, returning the one it replaced, if any.
    pub fn insert(&mut self, artifact: DataArtifact) -> Option<DataArtifact> {
        match self.index.get(artifact.name()) {
            Some(&slot) => Some(std::mem::replace(&mut self.artifacts[slot], artifact)),
            None => {
                self.index
                    .insert(artifact.name().to_string(), self.artifacts.len());
                self.artifacts.push(artifact);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DataArtifact> {
        self.index.get(name).map(|&slot| &self.artifacts[slot])
    }

    /// Like [`get`](Self::get), but failing with `UnknownArtifact`.
    pub fn require(&self, name: &str) -> Result<&DataArtifact, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::UnknownArtifact(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataArtifact> {
        self.artifacts.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(DataArtifact::name).collect()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.artifacts.iter().map(DataArtifact::summarize).collect()
    }
}
