use std::collections::BTreeSet;

use agent_tools::{
    RegistryConfig, Signature, ToolInvoker, ToolRegistration, ToolRegistry, generate_schema,
};
use proptest::prelude::*;
use serde_json::Value;

const NAMES: &[&str] = &["alpha", "beta", "gamma", "delta", "epsilon"];
const CATEGORIES: &[&str] = &["general", "math", "text"];

#[derive(Clone, Debug)]
enum Op {
    Register { name: usize, category: usize },
    Unregister(usize),
    Enable(usize),
    Disable(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0..NAMES.len(), 0..CATEGORIES.len())
            .prop_map(|(name, category)| Op::Register { name, category }),
        2 => (0..NAMES.len()).prop_map(Op::Unregister),
        1 => (0..NAMES.len()).prop_map(Op::Enable),
        1 => (0..NAMES.len()).prop_map(Op::Disable),
        1 => Just(Op::Clear),
    ]
}

fn registration(name: &str, category: &str) -> ToolRegistration {
    let invoker = ToolInvoker::from_sync(Signature::new(name), |_| Ok(Value::Null));
    let parameters = generate_schema(invoker.signature());
    ToolRegistration::new(name, invoker)
        .description("generated")
        .parameters(parameters)
        .category(category)
}

proptest! {
    #[test]
    fn category_index_matches_tools(ops in prop::collection::vec(op(), 0..48)) {
        let registry =
            ToolRegistry::with_config(RegistryConfig::new().with_warn_without_runtime(false));

        for op in ops {
            match op {
                Op::Register { name, category } => {
                    registry.register(registration(NAMES[name], CATEGORIES[category])).unwrap();
                }
                Op::Unregister(name) => {
                    registry.unregister(NAMES[name]);
                }
                Op::Enable(name) => {
                    registry.enable(NAMES[name]);
                }
                Op::Disable(name) => {
                    registry.disable(NAMES[name]);
                }
                Op::Clear => registry.clear(),
            }
        }

        let tools = registry.list_tools(None);
        let mut indexed = BTreeSet::new();
        for category in registry.list_categories() {
            let names = registry.list_tools(Some(&category));
            prop_assert!(!names.is_empty());
            for name in names {
                let tool = registry.get_tool(&name);
                prop_assert!(tool.is_some());
                let tool = tool.unwrap();
                prop_assert_eq!(tool.category(), category.as_str());
                prop_assert!(indexed.insert(name));
            }
        }
        prop_assert_eq!(indexed.into_iter().collect::<Vec<_>>(), tools);
    }

    #[test]
    fn definitions_list_exactly_the_enabled_tools(
        disabled in prop::collection::btree_set(0..NAMES.len(), 0..=NAMES.len())
    ) {
        let registry =
            ToolRegistry::with_config(RegistryConfig::new().with_warn_without_runtime(false));
        for name in NAMES {
            registry.register(registration(name, "general")).unwrap();
        }
        for index in &disabled {
            prop_assert!(registry.disable(NAMES[*index]));
        }

        let listed: Vec<String> = registry
            .get_tool_definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        let mut expected: Vec<String> = (0..NAMES.len())
            .filter(|index| !disabled.contains(index))
            .map(|index| NAMES[index].to_owned())
            .collect();
        expected.sort();
        prop_assert_eq!(listed, expected);
    }
}
