//! RRD graph template for the fan speed service.
//!
//! The graph engine consumes two strings per graph: the `opt` command line
//! options and the `def` list of RRD directives. Directives are kept typed
//! until [`GraphDefinition::render`] so colours and formats stay checked.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Consolidation {
    Last,
    Max,
    Average,
}

impl Consolidation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Last => "LAST",
            Self::Max => "MAX",
            Self::Average => "AVERAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    Def {
        name: String,
        rrd_file: String,
        data_source: String,
        consolidation: Consolidation,
    },
    Area {
        name: String,
        color: String,
        legend: String,
    },
    Line {
        width: u8,
        name: String,
        color: String,
        legend: String,
    },
    Gprint {
        name: String,
        consolidation: Consolidation,
        format: String,
    },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Def {
                name,
                rrd_file,
                data_source,
                consolidation,
            } => write!(
                f,
                "DEF:{name}={rrd_file}:{data_source}:{}",
                consolidation.as_str()
            ),
            Self::Area {
                name,
                color,
                legend,
            } => write!(f, "AREA:{name}{color}:\"{}\"", escape_colons(legend)),
            Self::Line {
                width,
                name,
                color,
                legend,
            } => write!(f, "LINE{width}:{name}{color}:\"{}\"", escape_colons(legend)),
            Self::Gprint {
                name,
                consolidation,
                format,
            } => write!(
                f,
                "GPRINT:{name}:{}:\"{}\"",
                consolidation.as_str(),
                escape_colons(format)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphOptions {
    pub vertical_label: String,
    pub title: String,
}

impl fmt::Display for GraphOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--vertical-label \"{}\" --title \"{}\" ",
            self.vertical_label, self.title
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDefinition {
    pub options: GraphOptions,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedGraph {
    pub opt: String,
    pub def: String,
}

impl GraphDefinition {
    pub fn render(&self) -> RenderedGraph {
        let def = self
            .directives
            .iter()
            .map(|directive| format!("{directive} "))
            .collect::<String>();
        RenderedGraph {
            opt: self.options.to_string(),
            def,
        }
    }
}

/// Identifies the RRD series a template plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSource<'a> {
    pub hostname: &'a str,
    pub service_description: &'a str,
    pub rrd_file: &'a str,
    pub data_source: &'a str,
}

/// Fan speed in rpm: filled area plus outline, with last, max and average
/// readings in the legend.
pub fn fan_speed(source: &GraphSource<'_>) -> GraphDefinition {
    const SERIES: &str = "var1";
    let series = || SERIES.to_string();

    GraphDefinition {
        options: GraphOptions {
            vertical_label: "rpm".to_string(),
            title: format!("{} / {}", source.hostname, source.service_description),
        },
        directives: vec![
            Directive::Def {
                name: series(),
                rrd_file: source.rrd_file.to_string(),
                data_source: source.data_source.to_string(),
                consolidation: Consolidation::Max,
            },
            Directive::Area {
                name: series(),
                color: "#2080ff".to_string(),
                legend: "Speed:".to_string(),
            },
            Directive::Gprint {
                name: series(),
                consolidation: Consolidation::Last,
                format: "%2.0lf rpm".to_string(),
            },
            Directive::Line {
                width: 1,
                name: series(),
                color: "#000080".to_string(),
                legend: String::new(),
            },
            Directive::Gprint {
                name: series(),
                consolidation: Consolidation::Max,
                format: "(Max: %2.0lf rpm,".to_string(),
            },
            Directive::Gprint {
                name: series(),
                consolidation: Consolidation::Average,
                format: "Avg: %2.0lf rpm)".to_string(),
            },
        ],
    }
}

fn escape_colons(text: &str) -> String {
    text.replace(':', "\\:")
}
