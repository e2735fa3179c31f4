/// Validate that the pipeline is properly configured: logging is up and the
/// built-in SQL grammar compiles and satisfies the root contract
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::logging::config::validate_config()?;

    let grammar = crate::sql::sql_crud_grammar()
        .map_err(|e| format!("Built-in SQL grammar failed to build: {}", e))?;

    crate::evaluation::check_root_contract(&grammar)
        .map_err(|e| format!("Built-in SQL grammar violates the root contract: {}", e))?;

    crate::evaluation::Schedule::for_grammar(&grammar)
        .map_err(|e| format!("Built-in SQL grammar cannot be scheduled: {}", e))?;

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "productions" => grammar.productions().len(),
        "profile" => crate::config::build_info::profile()
    );

    Ok(())
}
