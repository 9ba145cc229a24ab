//! Built-in map templates that can be loaded from the navigation bar.
//!
//! The catalog is fixed and constructed in-process; loading a template
//! replaces the current map content wholesale.

use crate::constants;
use crate::types::*;

/// Kinds of built-in templates available from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Prerequisites -> Core Concept -> Applications / Practice
    LearningPathway,
    /// Problem fan-out into analysis paths converging on a solution
    ProblemSolving,
    /// Central topic with related topics and sub-topics
    KnowledgeWeb,
}

/// Metadata for a single template catalog entry.
pub struct TemplateInfo {
    /// Stable identifier for the template
    pub kind: TemplateKind,
    /// Human-friendly display name
    pub name: &'static str,
    /// Short description shown in the templates menu
    pub description: &'static str,
}

/// Returns the full template catalog with display names.
pub const fn all_templates() -> &'static [TemplateInfo] {
    const TEMPLATES: &[TemplateInfo] = &[
        TemplateInfo {
            kind: TemplateKind::LearningPathway,
            name: "Learning Pathway",
            description: "A structured approach to learning new concepts",
        },
        TemplateInfo {
            kind: TemplateKind::ProblemSolving,
            name: "Problem Solving",
            description: "Break down complex problems into manageable parts",
        },
        TemplateInfo {
            kind: TemplateKind::KnowledgeWeb,
            name: "Knowledge Web",
            description: "Connect related topics and concepts",
        },
    ];
    TEMPLATES
}

/// Builds the map data for the given template kind.
pub fn build_template(kind: TemplateKind) -> ConceptMapData {
    match kind {
        TemplateKind::LearningPathway => build_learning_pathway(),
        TemplateKind::ProblemSolving => build_problem_solving(),
        TemplateKind::KnowledgeWeb => build_knowledge_web(),
    }
}

fn template_node(id: &str, x: f32, y: f32, text: &str, color: NodeColor, shape: NodeShape) -> ConceptNode {
    ConceptNode {
        id: id.to_string(),
        x,
        y,
        text: text.to_string(),
        color: color.display_color().to_string(),
        shape,
    }
}

fn template_metadata(title: &str, description: &str) -> MapMetadata {
    MapMetadata {
        title: title.to_string(),
        description: Some(description.to_string()),
        created: chrono::Utc::now().to_rfc3339(),
        version: constants::FORMAT_VERSION.to_string(),
    }
}

fn build_learning_pathway() -> ConceptMapData {
    ConceptMapData {
        nodes: vec![
            template_node("1", 200.0, 150.0, "Prerequisites", NodeColor::Blue, NodeShape::Rectangle),
            template_node("2", 400.0, 150.0, "Core Concept", NodeColor::Green, NodeShape::Circle),
            template_node("3", 600.0, 150.0, "Applications", NodeColor::Orange, NodeShape::Diamond),
            template_node("4", 400.0, 300.0, "Practice", NodeColor::Purple, NodeShape::Hexagon),
        ],
        connections: vec![
            Connection::new("1", "2"),
            Connection::new("2", "3"),
            Connection::new("2", "4"),
        ],
        metadata: template_metadata(
            "Learning Pathway Template",
            "A structured approach to learning",
        ),
    }
}

fn build_problem_solving() -> ConceptMapData {
    ConceptMapData {
        nodes: vec![
            template_node("1", 400.0, 100.0, "Problem", NodeColor::Pink, NodeShape::Oval),
            template_node("2", 200.0, 250.0, "Analysis", NodeColor::Blue, NodeShape::Rectangle),
            template_node("3", 400.0, 250.0, "Research", NodeColor::Teal, NodeShape::Circle),
            template_node("4", 600.0, 250.0, "Brainstorm", NodeColor::Green, NodeShape::Diamond),
            template_node("5", 400.0, 400.0, "Solution", NodeColor::Orange, NodeShape::Hexagon),
        ],
        connections: vec![
            Connection::new("1", "2"),
            Connection::new("1", "3"),
            Connection::new("1", "4"),
            Connection::new("2", "5"),
            Connection::new("3", "5"),
            Connection::new("4", "5"),
        ],
        metadata: template_metadata(
            "Problem Solving Template",
            "Break down complex problems",
        ),
    }
}

fn build_knowledge_web() -> ConceptMapData {
    ConceptMapData {
        nodes: vec![
            template_node("1", 400.0, 200.0, "Central Topic", NodeColor::Purple, NodeShape::Circle),
            template_node("2", 250.0, 120.0, "Related A", NodeColor::Blue, NodeShape::Rectangle),
            template_node("3", 550.0, 120.0, "Related B", NodeColor::Green, NodeShape::Diamond),
            template_node("4", 200.0, 300.0, "Sub-topic A1", NodeColor::Teal, NodeShape::Oval),
            template_node("5", 300.0, 350.0, "Sub-topic A2", NodeColor::Orange, NodeShape::Hexagon),
            template_node("6", 500.0, 350.0, "Sub-topic B1", NodeColor::Pink, NodeShape::Rectangle),
        ],
        connections: vec![
            Connection::new("1", "2"),
            Connection::new("1", "3"),
            Connection::new("2", "4"),
            Connection::new("2", "5"),
            Connection::new("3", "6"),
            Connection::new("4", "5"),
        ],
        metadata: template_metadata(
            "Knowledge Web Template",
            "Connect related topics and concepts",
        ),
    }
}
