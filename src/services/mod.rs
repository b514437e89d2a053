mod item_workflow_impl;

pub use item_workflow_impl::{ItemWorkflowBuilder, ItemWorkflowController, WorkflowConfig};
