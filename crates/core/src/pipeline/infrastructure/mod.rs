pub mod threaded_stage_executor;
