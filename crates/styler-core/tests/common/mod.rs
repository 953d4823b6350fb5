//! Shared sample trees for integration tests

#![allow(dead_code)]

use styler_core::{Meta, Node};

/// `[1, [2, 3], [[4, 5], 6]]`
pub fn nested_lists() -> Node {
    Node::Sequence(vec![
        Node::int(1),
        Node::Sequence(vec![Node::int(2), Node::int(3)]),
        Node::Sequence(vec![
            Node::Sequence(vec![Node::int(4), Node::int(5)]),
            Node::int(6),
        ]),
    ])
}

/// A module body with aliases, a qualified call and a pipe
pub fn module() -> Node {
    let body = Node::block(
        Meta::at(2),
        vec![
            Node::alias_declaration(&["My", "App", "Repo"], Meta::at(2)),
            Node::call(
                "def",
                Meta::at(4),
                vec![
                    Node::call("run", Meta::at(4), vec![Node::ident("xs")]),
                    Node::keyword(vec![(
                        "do",
                        Node::pipe(
                            Node::ident("xs"),
                            Node::remote_call(
                                Node::aliases(&["Enum"], Meta::at(5)),
                                "map",
                                Meta::at(5),
                                vec![Node::ident("f")],
                            ),
                            Meta::at(5),
                        ),
                    )]),
                ],
            ),
        ],
    );
    Node::call(
        "defmodule",
        Meta::at(1),
        vec![
            Node::aliases(&["My", "App"], Meta::at(1)),
            Node::keyword(vec![("do", body)]),
        ],
    )
}

/// Trees covering every node shape, including empty containers
pub fn corpus() -> Vec<Node> {
    vec![
        Node::int(7),
        Node::Sequence(vec![]),
        Node::Sequence(vec![Node::Sequence(vec![]), Node::nil()]),
        Node::pair(Node::atom("ok"), Node::Sequence(vec![Node::string("a")])),
        Node::call("f", Meta::at(1), vec![]),
        Node::remote_call(
            Node::aliases(&["A", "B"], Meta::at(1)),
            "c",
            Meta::at(1),
            vec![Node::int(1), Node::pair(Node::int(2), Node::int(3))],
        ),
        nested_lists(),
        module(),
    ]
}
