//! Tagged-line to program-tree parser.
//!
//! Structure is recovered from indentation exactly once, here. Comment and
//! blank lines never become nodes; everything else becomes a command, a
//! `break`, or a control header with a parsed body.

use kame_common::{Command, CompiledLine, Node, Program};

use crate::error::CompileError;

/// Parse compiled lines into the typed program tree.
pub fn parse(lines: &[CompiledLine]) -> Result<Program, CompileError> {
    let mut pos = 0;
    let nodes = parse_body(lines, &mut pos, 0)?;
    Ok(Program::new(nodes))
}

/// Parse one body: consecutive lines at `indent` or deeper. Stops at the
/// first non-skippable line shallower than `indent`.
fn parse_body(
    lines: &[CompiledLine],
    pos: &mut usize,
    indent: usize,
) -> Result<Vec<Node>, CompileError> {
    let mut nodes = Vec::new();

    while *pos < lines.len() {
        let line = &lines[*pos];
        if line.is_skippable() {
            *pos += 1;
            continue;
        }
        if line.indent < indent {
            break;
        }

        let text = line.text.trim().to_string();
        let block_index = line.block_index;

        if text == "break" {
            *pos += 1;
            nodes.push(Node::Break { block_index });
            continue;
        }

        if let Some(rest) = text.strip_prefix("while ").or_else(|| {
            (text == "while:").then_some(":")
        }) {
            let condition = header_condition(rest, &text, block_index)?;
            *pos += 1;
            let body = parse_body(lines, pos, indent + 1)?;
            nodes.push(Node::While {
                condition,
                body,
                block_index,
            });
            continue;
        }

        if let Some(rest) = text.strip_prefix("if ").or_else(|| {
            (text == "if:").then_some(":")
        }) {
            let condition = header_condition(rest, &text, block_index)?;
            *pos += 1;
            let then_body = parse_body(lines, pos, indent + 1)?;
            let mut else_body = Vec::new();
            if let Some(next) = lines.get(*pos) {
                if next.indent == indent && next.text.trim() == "else:" {
                    *pos += 1;
                    else_body = parse_body(lines, pos, indent + 1)?;
                }
            }
            nodes.push(Node::If {
                condition,
                then_body,
                else_body,
                block_index,
            });
            continue;
        }

        if let Some(count) = for_count(&text) {
            *pos += 1;
            let body = parse_body(lines, pos, indent + 1)?;
            nodes.push(Node::For {
                count,
                body,
                block_index,
            });
            continue;
        }

        // An else with no preceding if: drop the header and its body.
        if text == "else:" {
            *pos += 1;
            skip_deeper(lines, pos, indent);
            continue;
        }

        *pos += 1;
        nodes.push(Node::Command {
            command: Command::parse(&text),
            block_index,
        });
    }

    Ok(nodes)
}

/// Extract and validate a `while`/`if` header condition.
fn header_condition(
    rest: &str,
    full: &str,
    block_index: usize,
) -> Result<String, CompileError> {
    let condition = rest
        .strip_suffix(':')
        .ok_or_else(|| CompileError::MalformedHeader {
            block_index,
            text: full.to_string(),
        })?
        .trim();
    if condition.is_empty() {
        return Err(CompileError::MalformedHeader {
            block_index,
            text: full.to_string(),
        });
    }
    Ok(condition.to_string())
}

/// Match `for <name> in range(<digits>):` and return the iteration count.
/// Anything else is not a counted loop header.
fn for_count(text: &str) -> Option<i64> {
    let rest = text.strip_prefix("for ")?.strip_suffix(':')?.trim_end();
    let (var, range) = rest.split_once(" in ")?;
    let var = var.trim();
    if var.is_empty() || !var.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let digits = range.trim().strip_prefix("range(")?.strip_suffix(')')?.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Advance past every line strictly deeper than `indent`.
fn skip_deeper(lines: &[CompiledLine], pos: &mut usize, indent: usize) {
    while let Some(line) = lines.get(*pos) {
        if !line.is_skippable() && line.indent <= indent {
            break;
        }
        *pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kame_common::Direction;

    fn line(text: &str, indent: usize, block_index: usize) -> CompiledLine {
        CompiledLine::new(text, indent, block_index)
    }

    #[test]
    fn parse_commands_and_break() {
        let lines = vec![
            line("# program start", 0, 0),
            line("t.forward(2)", 0, 1),
            line("break", 0, 2),
        ];
        let program = parse(&lines).unwrap();
        assert_eq!(
            program.nodes,
            vec![
                Node::Command {
                    command: Command::Forward(2),
                    block_index: 1,
                },
                Node::Break { block_index: 2 },
            ]
        );
    }

    #[test]
    fn parse_for_loop_with_body() {
        let lines = vec![
            line("for i in range(4):", 0, 0),
            line("t.forward(1)", 1, 1),
            line("# end loop", 0, 2),
            line("t.penup()", 0, 3),
        ];
        let program = parse(&lines).unwrap();
        assert_eq!(program.nodes.len(), 2);
        match &program.nodes[0] {
            Node::For { count, body, .. } => {
                assert_eq!(*count, 4);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected for node, got {other:?}"),
        }
    }

    #[test]
    fn parse_if_else() {
        let lines = vec![
            line("if 箱A > 0:", 0, 0),
            line("t.moveDir('up', 1)", 1, 1),
            line("else:", 0, 2),
            line("t.moveDir('down', 1)", 1, 3),
            line("# end if", 0, 4),
        ];
        let program = parse(&lines).unwrap();
        match &program.nodes[0] {
            Node::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                assert_eq!(condition, "箱A > 0");
                assert_eq!(
                    then_body[0],
                    Node::Command {
                        command: Command::MoveDir(Direction::Up, 1),
                        block_index: 1,
                    }
                );
                assert_eq!(else_body.len(), 1);
            }
            other => panic!("expected if node, got {other:?}"),
        }
    }

    #[test]
    fn parse_nested_while_with_break() {
        let lines = vec![
            line("while 1:", 0, 0),
            line("if 箱A == 3:", 1, 1),
            line("break", 2, 2),
            line("# end if", 1, 3),
            line("t.forward(1)", 1, 4),
            line("# end loop", 0, 5),
        ];
        let program = parse(&lines).unwrap();
        match &program.nodes[0] {
            Node::While { condition, body, .. } => {
                assert_eq!(condition, "1");
                assert_eq!(body.len(), 2);
                match &body[0] {
                    Node::If { then_body, .. } => {
                        assert_eq!(then_body[0], Node::Break { block_index: 2 });
                    }
                    other => panic!("expected if node, got {other:?}"),
                }
            }
            other => panic!("expected while node, got {other:?}"),
        }
    }

    #[test]
    fn empty_condition_is_rejected() {
        let lines = vec![line("while :", 0, 0)];
        let err = parse(&lines).unwrap_err();
        assert_eq!(
            err,
            CompileError::MalformedHeader {
                block_index: 0,
                text: "while :".to_string(),
            }
        );

        let lines = vec![line("if :", 0, 3)];
        assert!(matches!(
            parse(&lines).unwrap_err(),
            CompileError::MalformedHeader { block_index: 3, .. }
        ));
    }

    #[test]
    fn malformed_for_header_is_a_plain_command() {
        let lines = vec![line("for x in range(abc):", 0, 0)];
        let program = parse(&lines).unwrap();
        assert_eq!(
            program.nodes,
            vec![Node::Command {
                command: Command::Noop,
                block_index: 0,
            }]
        );
    }

    #[test]
    fn stray_else_and_its_body_are_dropped() {
        let lines = vec![
            line("else:", 0, 0),
            line("t.forward(1)", 1, 1),
            line("t.penup()", 0, 2),
        ];
        let program = parse(&lines).unwrap();
        assert_eq!(
            program.nodes,
            vec![Node::Command {
                command: Command::PenUp,
                block_index: 2,
            }]
        );
    }

    #[test]
    fn comments_and_blanks_never_become_nodes() {
        let lines = vec![
            line("", 0, 0),
            line("# comment", 0, 1),
            line("t.pendown()", 0, 2),
        ];
        let program = parse(&lines).unwrap();
        assert_eq!(program.nodes.len(), 1);
    }
}
