pub mod analyze_commands;
