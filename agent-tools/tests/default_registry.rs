//! The default registry is process-wide, so everything touching it lives in
//! one test to keep ordering deterministic.

use std::sync::{Arc, Mutex};

use agent_tools::{
    DeclaredTool, Param, RegistryConfig, RuntimeRegistration, Signature, ToolError, ToolInvoker,
    ToolRegistration, ToolResult, ToolRuntime, TypeDescriptor, tool,
};
use serde_json::json;

/// Reverse a string.
#[tool(category = "text")]
fn reverse(text: String) -> String {
    text.chars().rev().collect()
}

#[derive(Default)]
struct RecordingRuntime {
    registered: Mutex<Vec<(String, String)>>,
}

impl ToolRuntime for RecordingRuntime {
    fn register_tool(&self, registration: RuntimeRegistration) -> ToolResult<()> {
        self.registered
            .lock()
            .unwrap()
            .push((registration.name, registration.version));
        Ok(())
    }
}

fn echo_invoker() -> ToolInvoker {
    let signature = Signature::new("echo").param(Param::new("message", TypeDescriptor::text()));
    ToolInvoker::from_sync(signature, |args| Ok(args["message"].clone()))
}

#[tokio::test]
async fn default_registry_lifecycle() {
    let registry = agent_tools::init_default_registry(RegistryConfig::default()).unwrap();
    let err = agent_tools::init_default_registry(RegistryConfig::default()).unwrap_err();
    assert!(matches!(err, ToolError::InvalidConfig(_)));
    assert!(std::ptr::eq(registry, agent_tools::default_registry()));

    // Declarations are collected on first use.
    assert_eq!(agent_tools::list_tools(None), vec!["reverse".to_owned()]);
    assert_eq!(ReverseTool::category(), "text");
    let reversed = registry.invoke("reverse", json!({"text": "abc"})).await.unwrap();
    assert_eq!(reversed, json!("cba"));

    let runtime = Arc::new(RecordingRuntime::default());
    assert_eq!(registry.attach_runtime(runtime.clone()), 1);

    let wrapped = tool("Echo a message")
        .category("text")
        .version("1.2.0")
        .wrap(|message: &str| message.to_owned(), echo_invoker())
        .unwrap();
    assert_eq!((*wrapped)("hi"), "hi");
    assert_eq!(wrapped.name(), "echo");
    assert_eq!(
        *runtime.registered.lock().unwrap(),
        vec![
            ("reverse".to_owned(), "1.0.0".to_owned()),
            ("echo".to_owned(), "1.2.0".to_owned()),
        ]
    );

    agent_tools::register_tool(
        ToolRegistration::new("sum", echo_invoker())
            .description("Adds numbers")
            .category("math"),
    )
    .unwrap();
    assert_eq!(
        agent_tools::list_categories(),
        vec!["math".to_owned(), "text".to_owned()]
    );
    assert_eq!(agent_tools::get_tool("sum").unwrap().category(), "math");

    assert!(agent_tools::disable_tool("echo"));
    let names: Vec<String> = agent_tools::get_tool_definitions()
        .into_iter()
        .map(|definition| definition.name)
        .collect();
    assert_eq!(names, vec!["reverse".to_owned(), "sum".to_owned()]);
    assert!(agent_tools::enable_tool("echo"));
    assert_eq!(agent_tools::get_tool_definitions().len(), 3);

    assert!(agent_tools::unregister_tool("sum"));
    assert!(!agent_tools::unregister_tool("sum"));
    assert!(!agent_tools::enable_tool("missing"));
    assert!(agent_tools::get_tool("missing").is_none());

    agent_tools::clear_tools();
    assert!(agent_tools::list_tools(None).is_empty());
    assert!(agent_tools::list_categories().is_empty());
}
