use minijinja::{Environment, context};

use crate::app::DashboardView;

const DASHBOARD_TEMPLATE: &str = "dashboard.html";

/// Template environment with the dashboard page loaded. `.html` templates
/// are auto-escaped.
pub fn templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(
        DASHBOARD_TEMPLATE,
        include_str!("../../templates/dashboard.html"),
    )?;
    Ok(env)
}

/// Render the full dashboard page: selector, map and table.
pub fn render_dashboard(env: &Environment<'_>, view: &DashboardView) -> Result<String, minijinja::Error> {
    env.get_template(DASHBOARD_TEMPLATE)?
        .render(context! { view => view })
}
