/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! Simplex bases and named basis checkpoints.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dimacs;

/// The status of an arc or node with respect to a basis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BasisStatus {
    /// Non-basic at its lower bound.
    AtLower,
    /// Basic.
    Basic,
    /// Non-basic at its upper bound.
    AtUpper,
}

impl BasisStatus {
    pub fn is_basic(self) -> bool {
        self == BasisStatus::Basic
    }

    /// The single letter code used in basis files.
    pub fn code(self) -> char {
        match self {
            BasisStatus::AtLower => 'L',
            BasisStatus::Basic => 'B',
            BasisStatus::AtUpper => 'U',
        }
    }

    pub fn from_code(code: &str) -> Option<BasisStatus> {
        match code {
            "L" => Some(BasisStatus::AtLower),
            "B" => Some(BasisStatus::Basic),
            "U" => Some(BasisStatus::AtUpper),
            _ => None,
        }
    }
}

impl fmt::Display for BasisStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BasisStatus::AtLower => "AT LOWER",
            BasisStatus::Basic => "AT BASIS",
            BasisStatus::AtUpper => "AT UPPER",
        };
        f.pad(s)
    }
}

/// A basis of a network flow problem.
///
/// Every arc and every node (i.e. the slack of its flow conservation
/// row) has a status.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Basis {
    pub arcs: Vec<BasisStatus>,
    pub nodes: Vec<BasisStatus>,
}

impl Basis {
    /// A basis with all arcs and nodes at their lower bound.
    pub fn new(narcs: usize, nnodes: usize) -> Basis {
        Basis {
            arcs: vec![BasisStatus::AtLower; narcs],
            nodes: vec![BasisStatus::AtLower; nnodes],
        }
    }

    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of basic arcs and nodes.
    pub fn num_basic(&self) -> usize {
        self.arcs.iter().chain(self.nodes.iter()).filter(|s| s.is_basic()).count()
    }

    /// Return the arcs whose status differs between `self` and `other`.
    pub fn changed_arcs<'a>(&'a self, other: &'a Basis) -> impl Iterator<Item = usize> + 'a {
        self.arcs
            .iter()
            .zip(other.arcs.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
    }
}

/// Error accessing a [`BasisStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown basis '{0}'")]
    Unknown(String),
    #[error("basis file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid basis file: {0}")]
    Dimacs(#[from] dimacs::Error),
}

/// A collection of named basis checkpoints.
///
/// Bases are always kept in memory. If the store has a directory, each
/// saved basis is also written to `<dir>/<name>.bas` and bases not in
/// memory are looked up there.
#[derive(Debug, Default)]
pub struct BasisStore {
    dir: Option<PathBuf>,
    bases: HashMap<String, Basis>,
}

impl BasisStore {
    /// Create an in-memory store.
    pub fn new() -> BasisStore {
        BasisStore::default()
    }

    /// Create a store that also persists bases to the directory `dir`.
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> BasisStore {
        BasisStore {
            dir: Some(dir.as_ref().to_path_buf()),
            bases: HashMap::new(),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// The file a basis with the given name is written to.
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(format!("{}.bas", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bases.contains_key(name) || self.path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Save `basis` under `name`, replacing an older basis of that name.
    pub fn save(&mut self, name: &str, basis: &Basis) -> Result<(), StoreError> {
        if let Some(path) = self.path(name) {
            dimacs::basis::write_to_file(&path, basis)?;
            debug!(
                component = "basis_store",
                operation = "save",
                name,
                path = %path.display(),
                "Basis written"
            );
        }
        self.bases.insert(name.to_string(), basis.clone());
        Ok(())
    }

    /// Load the basis saved under `name`.
    pub fn load(&self, name: &str) -> Result<Basis, StoreError> {
        if let Some(basis) = self.bases.get(name) {
            return Ok(basis.clone());
        }
        match self.path(name) {
            Some(path) if path.is_file() => Ok(dimacs::basis::read_from_file(&path)?),
            _ => Err(StoreError::Unknown(name.to_string())),
        }
    }
}
