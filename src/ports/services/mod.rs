mod item_workflow;

pub use item_workflow::ItemWorkflow;
