// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::breadcrumbs::BreadcrumbTrail;

const HOME_ALIAS: &str = "index";

/// Renders a trail as a Bulma breadcrumb bar. The current page, when given,
/// is appended as the active, unlinked entry.
pub fn render_breadcrumbs_html(trail: &BreadcrumbTrail, current_title: Option<&str>) -> String {
    if trail.is_empty() && current_title.is_none() {
        return String::new();
    }

    let mut html = String::new();
    html.push_str("<nav class=\"breadcrumb has-arrow-separator\" aria-label=\"breadcrumbs\">");
    html.push_str("<ul>");
    for crumb in trail.crumbs() {
        html.push_str("<li><a href=\"");
        html.push_str(&html_escape(&nav_path_for_alias(&crumb.source.alias)));
        html.push_str("\">");
        html.push_str(&html_escape(&crumb.source.title));
        html.push_str("</a></li>");
    }
    if let Some(title) = current_title {
        html.push_str("<li class=\"is-active\"><span>");
        html.push_str(&html_escape(title));
        html.push_str("</span></li>");
    }
    html.push_str("</ul>");
    html.push_str("</nav>");
    html
}

pub fn nav_path_for_alias(alias: &str) -> String {
    let alias = alias.trim_matches('/');
    if alias.is_empty() || alias == HOME_ALIAS {
        "/".to_string()
    } else {
        format!("/{}", alias)
    }
}

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::new();
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
