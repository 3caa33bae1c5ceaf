pub mod problem_message;
