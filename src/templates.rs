use crate::record::{Column, Record};
use crate::table::{SortDirection, SortState};
use handlebars::{Handlebars, TemplateError};
use serde::{Deserialize, Serialize};

pub const LOGIN: &str = "login";
pub const LOADING: &str = "loading";
pub const DASHBOARD: &str = "dashboard";

/// Template registry with every page compiled in
pub fn registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(LOGIN, include_str!("./static/login.html"))?;
    handlebars.register_template_string(LOADING, include_str!("./static/loading.html"))?;
    handlebars.register_template_string(DASHBOARD, include_str!("./static/dashboard.html"))?;
    Ok(handlebars)
}

/// Table state carried in the query string: `?q=..&sort=..&dir=..`
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TableQuery {
    #[serde(default)]
    pub q: String,
    pub sort: Option<Column>,
    pub dir: Option<SortDirection>,
}

impl TableQuery {
    pub fn sort_state(&self) -> SortState {
        match self.sort {
            Some(column) => SortState::by(column, self.dir.unwrap_or(SortDirection::Ascending)),
            None => SortState::unsorted(),
        }
    }

    /// Link to `path` carrying `filter` and `sort`
    pub fn href(path: &str, filter: &str, sort: SortState) -> String {
        let mut params = Vec::new();
        if !filter.is_empty() {
            params.push(format!("q={}", urlencoding::encode(filter)));
        }
        if let Some((column, direction)) = sort.as_pair() {
            params.push(format!("sort={}", column.key()));
            params.push(format!("dir={}", direction.key()));
        }

        if params.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, params.join("&"))
        }
    }
}

#[derive(Serialize)]
pub struct LoginPage<'a> {
    pub error: Option<&'a str>,
}

#[derive(Serialize)]
pub struct HeaderCell {
    pub label: &'static str,
    /// Where a click goes: the same table with this column's sort toggled
    pub href: String,
    pub indicator: &'static str,
}

#[derive(Serialize)]
pub struct DashboardPage {
    pub query: String,
    pub sort: Option<&'static str>,
    pub dir: Option<&'static str>,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
    pub total: usize,
    pub visible: usize,
    pub loaded_at: Option<String>,
    pub csv_href: String,
    pub xlsx_href: String,
}

impl DashboardPage {
    pub fn build(
        query: &TableQuery,
        rows: &[&Record],
        total: usize,
        loaded_at: Option<String>,
    ) -> Self {
        let sort = query.sort_state();
        let headers = Column::ALL
            .iter()
            .map(|&column| HeaderCell {
                label: column.header(),
                href: TableQuery::href("/dashboard", &query.q, sort.toggle(column)),
                indicator: match sort.direction_of(column) {
                    Some(SortDirection::Ascending) => "\u{25B2}",
                    Some(SortDirection::Descending) => "\u{25BC}",
                    None => "\u{21C5}",
                },
            })
            .collect();

        DashboardPage {
            query: query.q.clone(),
            sort: sort.column().map(Column::key),
            dir: sort.as_pair().map(|(_, direction)| direction.key()),
            headers,
            rows: rows
                .iter()
                .map(|record| Column::ALL.iter().map(|&c| record.display(c)).collect())
                .collect(),
            total,
            visible: rows.len(),
            loaded_at,
            csv_href: TableQuery::href("/dashboard/export.csv", &query.q, sort),
            xlsx_href: TableQuery::href("/dashboard/export.xlsx", &query.q, sort),
        }
    }
}
