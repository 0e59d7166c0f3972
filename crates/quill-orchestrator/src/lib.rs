pub mod accumulator;
pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod state;
pub mod tools;

pub use accumulator::SearchAccumulator;
pub use builder::OrchestratorBuilder;
pub use error::TurnError;
pub use orchestrator::Orchestrator;
pub use planner::{HeuristicPlanner, PlanContext, PlannedStep, SearchPlanner};
pub use state::{TurnState, TurnTracker};
pub use tools::SearchTool;
