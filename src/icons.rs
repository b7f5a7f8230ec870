//! Icon registry.
//!
//! Skills store their icon as a Lucide icon name chosen by the editor
//! (`"Code2"`, `"Layers"`, ...). [`resolve`] maps that name to an [`Icon`];
//! names the registry does not know fall back to [`FALLBACK`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Icon {
    Code2,
    Layers,
    MessageSquare,
    Database,
    Terminal,
    GraduationCap,
    Globe,
    Monitor,
    Smartphone,
    Cpu,
    BarChart3,
    Workflow,
    Sparkles,
}

pub const FALLBACK: Icon = Icon::Code2;

const REGISTRY: [(&str, Icon); 13] = [
    ("Code2", Icon::Code2),
    ("Layers", Icon::Layers),
    ("MessageSquare", Icon::MessageSquare),
    ("Database", Icon::Database),
    ("Terminal", Icon::Terminal),
    ("GraduationCap", Icon::GraduationCap),
    ("Globe", Icon::Globe),
    ("Monitor", Icon::Monitor),
    ("Smartphone", Icon::Smartphone),
    ("Cpu", Icon::Cpu),
    ("BarChart3", Icon::BarChart3),
    ("Workflow", Icon::Workflow),
    ("Sparkles", Icon::Sparkles),
];

impl Icon {
    pub fn name(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, icon)| icon == self)
            .map(|(name, _)| *name)
            .unwrap_or("Code2")
    }
}

/// Exact match first, then case-insensitive.
pub fn lookup(name: &str) -> Option<Icon> {
    let name = name.trim();
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .or_else(|| REGISTRY.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
        .map(|(_, icon)| *icon)
}

pub fn resolve(name: &str) -> Icon {
    lookup(name).unwrap_or(FALLBACK)
}

pub fn known_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}
