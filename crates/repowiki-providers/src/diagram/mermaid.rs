//! Mermaid structural parser
//!
//! Checks what a renderer would reject outright: an unknown or missing
//! diagram header, unbalanced brackets and quotes, unclosed or stray
//! `end` blocks, and edges or messages missing an endpoint. It does not
//! build a graph; the result only reports the diagram kind and statement
//! count.

use repowiki_domain::constants::DIAGRAM_FENCE_LANGUAGE;
use repowiki_domain::error::DiagramParseError;
use repowiki_domain::ports::providers::DiagramParser;
use repowiki_domain::value_objects::Diagram;

type ParseResult<T> = std::result::Result<T, DiagramParseError>;

const KNOWN_KINDS: &[&str] = &[
    "flowchart",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "classDiagram-v2",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
    "gitGraph",
    "mindmap",
    "timeline",
    "quadrantChart",
    "requirementDiagram",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Dynamic",
    "C4Deployment",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
    "packet-beta",
    "architecture-beta",
    "kanban",
];

const FLOWCHART_DIRECTIONS: &[&str] = &["TB", "TD", "BT", "RL", "LR"];

const FLOWCHART_ARROWS: &[&str] = &[
    "<-->", "-.->", "-->", "---", "==>", "===", "-.-", "--x", "--o",
];

const FLOWCHART_DIRECTIVES: &[&str] = &["classDef", "class", "style", "linkStyle", "click", "direction"];

// Longest first so `-->>` wins over `-->` and `->`
const SEQUENCE_ARROWS: &[&str] = &[
    "<<-->>", "<<->>", "-->>", "->>", "--x", "--)", "-->", "-x", "-)", "->",
];

const SEQUENCE_BLOCKS: &[&str] = &["loop", "alt", "opt", "par", "critical", "break", "rect", "box"];

const SEQUENCE_CONTINUATIONS: &[&str] = &["else", "and", "option"];

const SEQUENCE_KEYWORDS: &[&str] = &[
    "participant",
    "actor",
    "autonumber",
    "activate",
    "deactivate",
    "note",
    "Note",
    "title",
    "create",
    "destroy",
    "link",
    "links",
    "properties",
    "details",
];

/// One non-comment, non-blank line with its 1-based line number
#[derive(Debug, Clone, Copy)]
struct Statement<'a> {
    line: usize,
    text: &'a str,
}

impl Statement<'_> {
    fn keyword(&self) -> &str {
        self.text
            .split(|c: char| c.is_whitespace() || c == ':' || c == ';')
            .next()
            .unwrap_or_default()
    }
}

/// Structural parser for Mermaid diagrams
#[derive(Debug, Clone, Copy, Default)]
pub struct MermaidParser;

impl MermaidParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }

    fn statements(source: &str) -> ParseResult<Vec<Statement<'_>>> {
        let mut lines = source
            .lines()
            .enumerate()
            .map(|(i, text)| (i + 1, text.trim()))
            .peekable();

        // Front matter: a leading `---` block
        while lines.peek().is_some_and(|(_, text)| text.is_empty()) {
            lines.next();
        }
        if let Some((start, "---")) = lines.peek().copied() {
            lines.next();
            if !lines.by_ref().any(|(_, text)| text == "---") {
                return Err(DiagramParseError::at_line(start, "unterminated front matter"));
            }
        }

        Ok(lines
            .filter(|(_, text)| !text.is_empty() && !text.starts_with("%%"))
            .map(|(line, text)| Statement { line, text })
            .collect())
    }

    fn parse_header(header: &Statement<'_>) -> ParseResult<String> {
        let text = header.text.trim_end_matches(';');
        let mut words = text.split_whitespace();
        let kind = words.next().unwrap_or_default();
        if !KNOWN_KINDS.contains(&kind) {
            return Err(DiagramParseError::at_line(
                header.line,
                format!("unknown diagram type '{kind}'"),
            ));
        }
        if matches!(kind, "flowchart" | "graph")
            && let Some(direction) = words.next()
            && !FLOWCHART_DIRECTIONS.contains(&direction)
        {
            return Err(DiagramParseError::at_line(
                header.line,
                format!("invalid flowchart direction '{direction}'"),
            ));
        }
        Ok(kind.to_string())
    }

    /// Quotes must close on the line they open; brackets may span lines
    fn check_balance(body: &[Statement<'_>], asymmetric_shapes: bool) -> ParseResult<()> {
        let mut open: Vec<(char, usize)> = Vec::new();
        for statement in body {
            let mut in_quote = false;
            // Inside an edge label such as `-->|text|`
            let mut in_label = false;
            let mut previous = ' ';
            for c in statement.text.chars() {
                if c == '"' {
                    in_quote = !in_quote;
                } else if !in_quote {
                    match c {
                        '|' if open.is_empty() => in_label = !in_label,
                        '(' | '[' | '{' => open.push((c, statement.line)),
                        // `A>label]` is the asymmetric node shape
                        '>' if asymmetric_shapes
                            && !in_label
                            && open.is_empty()
                            && (previous.is_alphanumeric() || previous == '_') =>
                        {
                            open.push(('>', statement.line));
                        }
                        ')' | ']' | '}' => {
                            let matched = match open.pop() {
                                Some((opener, _)) => matches!(
                                    (opener, c),
                                    ('(', ')') | ('[', ']') | ('{', '}') | ('>', ']')
                                ),
                                None => false,
                            };
                            if !matched {
                                return Err(DiagramParseError::at_line(
                                    statement.line,
                                    format!("unexpected '{c}'"),
                                ));
                            }
                        }
                        _ => {}
                    }
                }
                previous = c;
            }
            if in_quote {
                return Err(DiagramParseError::at_line(statement.line, "unterminated string"));
            }
        }
        match open.pop() {
            Some((opener, line)) => Err(DiagramParseError::at_line(line, format!("unclosed '{opener}'"))),
            None => Ok(()),
        }
    }

    fn check_flowchart(body: &[Statement<'_>]) -> ParseResult<()> {
        let mut subgraphs: Vec<usize> = Vec::new();
        for statement in body {
            match statement.keyword() {
                "subgraph" => subgraphs.push(statement.line),
                "end" => {
                    if subgraphs.pop().is_none() {
                        return Err(DiagramParseError::at_line(statement.line, "'end' without 'subgraph'"));
                    }
                }
                keyword if FLOWCHART_DIRECTIVES.contains(&keyword) => {}
                _ => Self::check_edge(statement)?,
            }
        }
        match subgraphs.pop() {
            Some(line) => Err(DiagramParseError::at_line(line, "unclosed 'subgraph'")),
            None => Ok(()),
        }
    }

    fn check_edge(statement: &Statement<'_>) -> ParseResult<()> {
        let text = statement.text.trim_end_matches(';');
        let first = FLOWCHART_ARROWS
            .iter()
            .filter_map(|arrow| text.find(arrow))
            .min();
        let last = FLOWCHART_ARROWS
            .iter()
            .filter_map(|arrow| text.rfind(arrow).map(|at| at + arrow.len()))
            .max();
        let (Some(first), Some(last)) = (first, last) else {
            return Ok(());
        };

        if text[..first].trim().is_empty() {
            return Err(DiagramParseError::at_line(statement.line, "edge without source"));
        }
        let mut target = text[last..].trim_start_matches(['-', '.', '=', '>']).trim();
        // `-->|label| B`
        if let Some(rest) = target.strip_prefix('|') {
            target = rest.split_once('|').map_or("", |(_, after)| after).trim();
        }
        if target.is_empty() {
            return Err(DiagramParseError::at_line(statement.line, "edge without target"));
        }
        Ok(())
    }

    fn check_sequence(body: &[Statement<'_>]) -> ParseResult<()> {
        let mut blocks: Vec<usize> = Vec::new();
        for statement in body {
            let keyword = statement.keyword();
            if SEQUENCE_BLOCKS.contains(&keyword) {
                blocks.push(statement.line);
            } else if keyword == "end" {
                if blocks.pop().is_none() {
                    return Err(DiagramParseError::at_line(statement.line, "'end' without an open block"));
                }
            } else if SEQUENCE_CONTINUATIONS.contains(&keyword) {
                if blocks.is_empty() {
                    return Err(DiagramParseError::at_line(
                        statement.line,
                        format!("'{keyword}' outside of a block"),
                    ));
                }
            } else if !SEQUENCE_KEYWORDS.contains(&keyword) {
                Self::check_message(statement)?;
            }
        }
        match blocks.pop() {
            Some(line) => Err(DiagramParseError::at_line(line, "unclosed block")),
            None => Ok(()),
        }
    }

    fn check_message(statement: &Statement<'_>) -> ParseResult<()> {
        let (signature, _message) = statement
            .text
            .split_once(':')
            .unwrap_or((statement.text, ""));
        let arrow = SEQUENCE_ARROWS
            .iter()
            .filter_map(|arrow| signature.find(arrow).map(|at| (at, arrow.len())))
            .min_by_key(|(at, len)| (*at, std::cmp::Reverse(*len)));
        let Some((at, len)) = arrow else {
            return Err(DiagramParseError::at_line(
                statement.line,
                format!("unrecognized statement '{}'", statement.text),
            ));
        };

        if signature[..at].trim().is_empty() {
            return Err(DiagramParseError::at_line(statement.line, "message without sender"));
        }
        if signature[at + len..].trim().trim_start_matches(['+', '-']).trim().is_empty() {
            return Err(DiagramParseError::at_line(statement.line, "message without receiver"));
        }
        Ok(())
    }
}

impl DiagramParser for MermaidParser {
    fn parse(&self, source: &str) -> ParseResult<Diagram> {
        let statements = Self::statements(source)?;
        let Some((header, body)) = statements.split_first() else {
            return Err(DiagramParseError::new("empty diagram"));
        };

        let kind = Self::parse_header(header)?;
        match kind.as_str() {
            "flowchart" | "graph" => {
                Self::check_balance(body, true)?;
                Self::check_flowchart(body)?;
            }
            "sequenceDiagram" => {
                Self::check_balance(body, false)?;
                Self::check_sequence(body)?;
            }
            "classDiagram" | "classDiagram-v2" | "stateDiagram" | "stateDiagram-v2" => {
                Self::check_balance(body, false)?;
            }
            // Cardinality markers such as `||--o{` use braces unpaired
            _ => {}
        }

        Ok(Diagram {
            kind,
            statement_count: body.len(),
        })
    }

    fn language(&self) -> &str {
        DIAGRAM_FENCE_LANGUAGE
    }
}
