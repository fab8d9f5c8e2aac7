// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sockets: the typed ports that steps expose and edges connect.

use serde::{Deserialize, Serialize};

/// Whether a socket carries a value along the happy path or merely
/// sequences execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SocketKind {
    Data,
    Control,
}

/// Which side of a step a socket belongs to. Derived from whether the
/// socket lives in the step's `inputs` or `outputs` vector; stored
/// explicitly so edge validation doesn't need to walk back to the owning
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SocketDir {
    In,
    Out,
}

impl Default for SocketDir {
    /// Placeholder used only while deserializing: the JSON wire format
    /// never carries `dir` (it's `#[serde(skip)]`), since it's implied by
    /// whether a socket sits in a step's `inputs` or `outputs` array. Every
    /// `Step` variant's deserialization normalizes this to the real value
    /// via [`finalize_dirs`] before the socket is used.
    fn default() -> Self {
        SocketDir::In
    }
}

/// Stamp the correct `dir` on every socket in `inputs`/`outputs` after
/// deserialization. Mirrors the source's `model_post_init`, which assigns
/// `_dir` by which list a socket was parsed into rather than trusting the
/// wire format to say so.
pub fn finalize_dirs(inputs: &mut [Socket], outputs: &mut [Socket]) {
    for socket in inputs {
        socket.dir = SocketDir::In;
    }
    for socket in outputs {
        socket.dir = SocketDir::Out;
    }
}

/// A file delivered into the executor's working tree alongside a compiled
/// program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLiteral {
    /// Path relative to the program's working directory.
    pub path: String,
    pub content: String,
    /// Trusted files may be imported directly; untrusted ones must be
    /// invoked through the sandbox worker (see `gradeforge-compiler::sandbox`).
    #[serde(default)]
    pub trusted: bool,
}

/// The literal value an `Input` step's output socket (or a comparison
/// reference) can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    File(FileLiteral),
}

impl Literal {
    /// `true` for the four primitive variants, `false` for `File`.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Literal::File(_))
    }

    pub fn as_file(&self) -> Option<&FileLiteral> {
        match self {
            Literal::File(f) => Some(f),
            _ => None,
        }
    }
}

/// A named input/output port on a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub id: String,
    pub kind: SocketKind,
    #[serde(skip)]
    pub dir: SocketDir,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub literal: Option<Literal>,
}

impl Socket {
    pub fn data(id: impl Into<String>, dir: SocketDir) -> Self {
        Socket {
            id: id.into(),
            kind: SocketKind::Data,
            dir,
            label: String::new(),
            literal: None,
        }
    }

    pub fn control(id: impl Into<String>, dir: SocketDir) -> Self {
        Socket {
            id: id.into(),
            kind: SocketKind::Control,
            dir,
            label: String::new(),
            literal: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, SocketKind::Data)
    }
}
