// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Academic lookup choices (years and departments).
//!
//! Both tables are keyed by `code`, so code uniqueness comes from the key.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    load, load_all, put, ClubDatabase, StoreError, StoreResult, DEPARTMENTS, YEARS,
};

const YEAR_CODE_MAX: usize = 10;
const DEPARTMENT_CODE_MAX: usize = 50;

/// Department category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum DepartmentCategory {
    /// Undergraduate
    #[default]
    UG,
    /// Postgraduate
    PG,
    /// Doctoral
    PhD,
}

impl DepartmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentCategory::UG => "UG",
            DepartmentCategory::PG => "PG",
            DepartmentCategory::PhD => "PhD",
        }
    }
}

/// Which lookup table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Years,
    Departments,
}

/// Academic year option.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Year {
    pub code: String,
    pub display_name: String,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Department option.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Department {
    pub code: String,
    pub full_name: String,
    pub category: DepartmentCategory,
    pub is_active: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Year {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>, order: i32) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            display_name: display_name.into(),
            is_active: true,
            order,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Department {
    pub fn new(
        code: impl Into<String>,
        full_name: impl Into<String>,
        category: DepartmentCategory,
        order: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            full_name: full_name.into(),
            category,
            is_active: true,
            order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Common shape of a lookup entry.
pub trait ChoiceEntry: Serialize + DeserializeOwned {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]>;
    const CODE_MAX: usize;

    fn code(&self) -> &str;
    fn label(&self) -> &str;
    fn is_active(&self) -> bool;
    fn touch(&mut self);
    /// Sort key for unfiltered listings.
    fn sort_key(&self) -> (&str, i32, &str);
}

impl ChoiceEntry for Year {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = YEARS;
    const CODE_MAX: usize = YEAR_CODE_MAX;

    fn code(&self) -> &str {
        &self.code
    }
    fn label(&self) -> &str {
        &self.display_name
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
    fn sort_key(&self) -> (&str, i32, &str) {
        ("", self.order, &self.code)
    }
}

impl ChoiceEntry for Department {
    const TABLE: TableDefinition<'static, &'static str, &'static [u8]> = DEPARTMENTS;
    const CODE_MAX: usize = DEPARTMENT_CODE_MAX;

    fn code(&self) -> &str {
        &self.code
    }
    fn label(&self) -> &str {
        &self.full_name
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
    fn sort_key(&self) -> (&str, i32, &str) {
        (self.category.as_str(), self.order, &self.code)
    }
}

/// A `(code, label)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Choice {
    pub code: String,
    pub label: String,
}

/// Repository for lookup choices.
pub struct ChoiceRepository<'a> {
    db: &'a ClubDatabase,
}

impl<'a> ChoiceRepository<'a> {
    pub fn new(db: &'a ClubDatabase) -> Self {
        Self { db }
    }

    /// Every entry of a table, in display order.
    pub fn list<T: ChoiceEntry>(&self) -> StoreResult<Vec<T>> {
        let mut entries: Vec<T> = self.db.read(|txn| load_all(&txn.open_table(T::TABLE)?))?;
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(entries)
    }

    pub fn get<T: ChoiceEntry>(&self, code: &str) -> StoreResult<T> {
        self.db
            .read(|txn| load(&txn.open_table(T::TABLE)?, code))?
            .ok_or_else(|| StoreError::NotFound(format!("Choice {code}")))
    }

    /// Insert a new entry; the code must be unused.
    pub fn create<T: ChoiceEntry>(&self, entry: T) -> StoreResult<T> {
        let code = entry.code();
        if code.is_empty() || code.len() > T::CODE_MAX {
            return Err(StoreError::Validation(format!(
                "code must be between 1 and {} characters",
                T::CODE_MAX
            )));
        }
        if entry.label().trim().is_empty() {
            return Err(StoreError::Validation("label is required".into()));
        }
        self.db.write(|txn| {
            let mut table = txn.open_table(T::TABLE)?;
            if table.get(code)?.is_some() {
                return Err(StoreError::Validation(format!(
                    "choice with code {code} already exists"
                )));
            }
            put(&mut table, code, &entry)
        })?;
        Ok(entry)
    }

    /// Apply `mutate` to an existing entry. The code itself is immutable.
    pub fn update<T, F>(&self, code: &str, mutate: F) -> StoreResult<T>
    where
        T: ChoiceEntry,
        F: FnOnce(&mut T),
    {
        self.db.write(|txn| {
            let mut table = txn.open_table(T::TABLE)?;
            let mut entry: T = load(&table, code)?
                .ok_or_else(|| StoreError::NotFound(format!("Choice {code}")))?;
            mutate(&mut entry);
            if entry.code() != code {
                return Err(StoreError::Validation("code cannot be changed".into()));
            }
            entry.touch();
            put(&mut table, code, &entry)?;
            Ok(entry)
        })
    }

    pub fn delete<T: ChoiceEntry>(&self, code: &str) -> StoreResult<()> {
        self.db.write(|txn| {
            let mut table = txn.open_table(T::TABLE)?;
            if table.remove(code)?.is_none() {
                return Err(StoreError::NotFound(format!("Choice {code}")));
            }
            Ok(())
        })
    }

    /// Active `(code, label)` pairs.
    ///
    /// Years are ordered by `order`. Departments are ordered by category then
    /// `order`, or only by `order` when filtered to one category.
    pub fn active_choices(
        &self,
        kind: ChoiceKind,
        category: Option<DepartmentCategory>,
    ) -> StoreResult<Vec<Choice>> {
        fn pairs<T: ChoiceEntry>(entries: impl Iterator<Item = T>) -> Vec<Choice> {
            entries
                .filter(ChoiceEntry::is_active)
                .map(|e| Choice {
                    code: e.code().to_string(),
                    label: e.label().to_string(),
                })
                .collect()
        }

        Ok(match kind {
            ChoiceKind::Years => pairs(self.list::<Year>()?.into_iter()),
            ChoiceKind::Departments => pairs(
                self.list::<Department>()?
                    .into_iter()
                    .filter(|d| category.is_none_or(|c| c == d.category)),
            ),
        })
    }

    /// Insert the default years and departments.
    ///
    /// With `clear`, both tables are emptied first. Each table is only
    /// populated when it is empty. Returns the resulting `(years, departments)`
    /// counts.
    pub fn populate_defaults(&self, clear: bool) -> StoreResult<(usize, usize)> {
        self.db.write(|txn| {
            let mut years = txn.open_table(YEARS)?;
            let mut departments = txn.open_table(DEPARTMENTS)?;
            if clear {
                years.retain(|_, _| false)?;
                departments.retain(|_, _| false)?;
            }

            if years.is_empty()? {
                for (code, name, order) in DEFAULT_YEARS {
                    put(&mut years, code, &Year::new(*code, *name, *order))?;
                }
            }
            if departments.is_empty()? {
                for (code, name, order) in DEFAULT_DEPARTMENTS {
                    let dept = Department::new(*code, *name, DepartmentCategory::UG, *order);
                    put(&mut departments, code, &dept)?;
                }
            }
            Ok((years.len()? as usize, departments.len()? as usize))
        })
    }
}

const DEFAULT_YEARS: &[(&str, &str, i32)] = &[
    ("1", "Year I (2025)", 1),
    ("2", "Year II (2024)", 2),
    ("3", "Year III (2023)", 3),
    ("4", "Year IV (2022)", 4),
    ("PG1", "PG Year I", 5),
    ("PG2", "PG Year II", 6),
    ("PhD", "Ph.D.", 7),
];

const DEFAULT_DEPARTMENTS: &[(&str, &str, i32)] = &[
    ("Aero", "Aeronautical Engineering", 1),
    ("Auto", "Automobile Engineering", 2),
    ("BME", "Biomedical Engineering", 3),
    ("Biotech", "Biotechnology", 4),
    ("Chem", "Chemical Engineering", 5),
    ("Civil", "Civil Engineering", 6),
    ("CSE", "Computer Science & Engineering", 7),
    ("CSE_CS", "Computer Science & Engineering (Cyber Security)", 8),
    ("CSBS", "Computer Science & Business Systems", 9),
    ("CSD", "Computer Science & Design", 10),
    ("EEE", "Electrical & Electronics Engineering", 11),
    ("ECE", "Electronics & Communication Engineering", 12),
    ("FT", "Food Technology", 13),
    ("IT", "Information Technology", 14),
    ("AIML", "Artificial Intelligence & Machine Learning", 15),
    ("AIDS", "Artificial Intelligence & Data Science", 16),
    ("Mech", "Mechanical Engineering", 17),
    ("MCT", "Mechatronics Engineering", 18),
    ("Robotics", "Robotics & Automation", 19),
    ("HS", "Humanities & Sciences", 20),
    ("MS", "Management Studies", 21),
];
