//! Graph export of transition tables.

use crate::builder::TransitionTable;
use crate::core::{Context, EventKind, State};
use crate::effects::StateMachine;
use std::fmt::Write;

fn edge_label<S: State, E: EventKind, C: Context>(
    transition: &crate::effects::Transition<S, E, C>,
) -> String {
    let mut label = transition.on.name().to_string();
    if transition.has_guard() {
        label.push_str(" [guard]");
    }
    if transition.has_effect() {
        label.push_str(" / effect");
    }
    label
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render the table as a Graphviz DOT digraph.
///
/// Final states are drawn as double circles and `current`, when given, is
/// filled.
pub fn to_dot<S: State, E: EventKind, C: Context>(
    table: &TransitionTable<S, E, C>,
    current: Option<&S>,
) -> String {
    let mut out = String::from("digraph state_machine {\n    rankdir=LR;\n");

    for def in table.states() {
        let shape = if def.is_final { "doublecircle" } else { "circle" };
        let fill = if current == Some(&def.state) {
            ", style=filled, fillcolor=lightblue"
        } else {
            ""
        };
        let _ = writeln!(out, "    {} [shape={shape}{fill}];", quote(def.name()));
    }

    for transition in table.transitions() {
        let _ = writeln!(
            out,
            "    {} -> {} [label={}];",
            quote(transition.from.name()),
            quote(transition.to.name()),
            quote(&edge_label(transition))
        );
    }

    out.push_str("}\n");
    out
}

/// Render the table as a Mermaid `stateDiagram-v2`.
pub fn to_mermaid<S: State, E: EventKind, C: Context>(
    table: &TransitionTable<S, E, C>,
    initial: &S,
    current: Option<&S>,
) -> String {
    let mut out = String::from("stateDiagram-v2\n");
    let _ = writeln!(out, "    [*] --> {}", initial.name());

    for transition in table.transitions() {
        let _ = writeln!(
            out,
            "    {} --> {}: {}",
            transition.from.name(),
            transition.to.name(),
            edge_label(transition)
        );
    }

    for def in table.states().iter().filter(|def| def.is_final) {
        let _ = writeln!(out, "    {} --> [*]", def.name());
    }

    if let Some(current) = current {
        out.push_str("    classDef current fill:#add8e6\n");
        let _ = writeln!(out, "    class {} current", current.name());
    }

    out
}

impl<S: State, E: EventKind, C: Context> StateMachine<S, E, C> {
    /// DOT rendering of the table with the current state highlighted.
    pub fn to_dot(&self) -> String {
        to_dot(self.table(), Some(self.current_state()))
    }

    /// Mermaid rendering of the table with the current state highlighted.
    pub fn to_mermaid(&self) -> String {
        to_mermaid(self.table(), self.initial_state(), Some(self.current_state()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{guarded_transition, simple_transition, TableBuilder};
    use crate::core::Event;

    crate::state_enum! {
        enum Order {
            Cart => "cart",
            Paid => "paid",
            Shipped => "shipped",
        }
        final: [Shipped]
    }

    crate::event_enum! {
        enum OrderEvent {
            Pay => "PAY",
            Ship => "SHIP",
        }
    }

    fn table() -> TransitionTable<Order, OrderEvent, ()> {
        TableBuilder::new()
            .states([Order::Cart, Order::Paid, Order::Shipped])
            .add_transition(simple_transition(Order::Cart, OrderEvent::Pay, Order::Paid))
            .add_transition(guarded_transition(
                Order::Paid,
                OrderEvent::Ship,
                Order::Shipped,
                |_: &(), _: &Event<OrderEvent>| true,
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn dot_lists_nodes_and_edges() {
        let dot = to_dot(&table(), Some(&Order::Paid));

        assert!(dot.starts_with("digraph state_machine {"));
        assert!(dot.contains("\"cart\" [shape=circle];"));
        assert!(dot.contains("\"paid\" [shape=circle, style=filled, fillcolor=lightblue];"));
        assert!(dot.contains("\"shipped\" [shape=doublecircle];"));
        assert!(dot.contains("\"cart\" -> \"paid\" [label=\"PAY\"];"));
        assert!(dot.contains("\"paid\" -> \"shipped\" [label=\"SHIP [guard]\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn mermaid_marks_initial_final_and_current() {
        let mermaid = to_mermaid(&table(), &Order::Cart, Some(&Order::Cart));

        assert!(mermaid.starts_with("stateDiagram-v2\n"));
        assert!(mermaid.contains("[*] --> cart"));
        assert!(mermaid.contains("cart --> paid: PAY"));
        assert!(mermaid.contains("shipped --> [*]"));
        assert!(mermaid.contains("class cart current"));
    }

    #[test]
    fn machine_renders_its_current_state() {
        let mut machine = StateMachine::new(table(), Order::Cart, ()).unwrap();
        let _ = machine.transition(Event::now(OrderEvent::Pay));

        assert!(machine
            .to_dot()
            .contains("\"paid\" [shape=circle, style=filled, fillcolor=lightblue];"));
        assert!(machine.to_mermaid().contains("class paid current"));
        assert!(machine.to_mermaid().contains("[*] --> cart"));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
