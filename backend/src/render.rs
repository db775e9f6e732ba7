//! HTML fragment rendering for dynamic list swaps. All user-supplied text
//! goes through `escape` before it reaches the markup, and every emitted URL
//! carries the active page/search/completed context so a swap stays within
//! the listing the client is looking at.

use shared::{FilterOptions, Pagination, Task, NO_PAGE};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode_query_value(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// The search/completed tail of a fragment URL, ready to append after a
/// `page=` parameter inside an HTML attribute.
fn filter_params(opts: &FilterOptions) -> String {
    let mut params = String::new();
    if !opts.search.is_empty() {
        params.push_str("&amp;search=");
        params.push_str(&encode_query_value(&opts.search));
    }
    if let Some(completed) = opts.completed {
        params.push_str(&format!("&amp;completed={completed}"));
    }
    params
}

/// Render the task-list fragment: the page of tasks plus paging controls.
pub fn task_list(page: &Pagination, opts: &FilterOptions) -> String {
    let params = filter_params(opts);
    let mut html = String::from("<div id=\"task-list\">\n<ul class=\"tasks\">\n");
    for task in &page.results {
        html.push_str(&task_item(task, page.current_page, &params));
    }
    html.push_str("</ul>\n");
    html.push_str(&paging_controls(page, &params));
    html.push_str("</div>\n");
    html
}

fn task_item(task: &Task, current_page: u64, params: &str) -> String {
    let checked = if task.completed { " checked" } else { "" };
    let class = if task.completed { "task done" } else { "task" };
    format!(
        "<li class=\"{class}\" id=\"task-{id}\">\
         <input type=\"checkbox\"{checked} \
         hx-patch=\"/tasks/toggle/{id}?page={current_page}{params}\" \
         hx-target=\"#task-list\" hx-swap=\"outerHTML\">\
         <span class=\"title\">{title}</span>\
         <span class=\"description\">{description}</span>\
         </li>\n",
        id = task.id,
        title = escape(&task.title),
        description = escape(&task.description),
    )
}

fn paging_controls(page: &Pagination, params: &str) -> String {
    let mut html = format!(
        "<nav class=\"paging\">Page {} of {} ({} tasks)",
        page.current_page, page.total_pages, page.total_results
    );
    if page.previous != NO_PAGE {
        html.push_str(&format!(
            " <a hx-get=\"/tasks/fragment?page={0}{params}\" hx-target=\"#task-list\" \
             hx-swap=\"outerHTML\" href=\"#\">previous</a>",
            page.previous
        ));
    }
    if page.next != NO_PAGE {
        html.push_str(&format!(
            " <a hx-get=\"/tasks/fragment?page={0}{params}\" hx-target=\"#task-list\" \
             hx-swap=\"outerHTML\" href=\"#\">next</a>",
            page.next
        ));
    }
    html.push_str("</nav>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TaskId;

    fn page_with(results: Vec<Task>, current: u64, total: u64) -> Pagination {
        Pagination {
            total_results: results.len() as u64,
            results,
            current_page: current,
            total_pages: total,
            previous: if current > 1 { current - 1 } else { NO_PAGE },
            next: if current < total { current + 1 } else { NO_PAGE },
        }
    }

    fn task(title: &str) -> Task {
        Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: String::new(),
            completed: false,
        }
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape("<b>\"&'</b>"),
            "&lt;b&gt;&quot;&amp;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn task_titles_are_escaped_in_fragments() {
        let task = task("<script>alert(1)</script>");
        let html = task_list(&page_with(vec![task], 1, 1), &FilterOptions::new());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn sentinel_pages_render_no_links() {
        let html = task_list(&page_with(vec![], 1, 1), &FilterOptions::new());
        assert!(!html.contains("previous"));
        assert!(!html.contains("next"));
    }

    #[test]
    fn middle_page_renders_both_links() {
        let html = task_list(&page_with(vec![], 2, 3), &FilterOptions::new());
        assert!(html.contains("page=1"));
        assert!(html.contains("page=3"));
        assert!(html.contains("previous"));
        assert!(html.contains("next"));
    }

    #[test]
    fn links_carry_the_active_search_and_completed_context() {
        let opts = FilterOptions {
            page: 2,
            page_size: 10,
            search: "foo bar".to_string(),
            completed: Some(true),
        };
        let html = task_list(&page_with(vec![task("foo bar one")], 2, 3), &opts);

        // toggle stays on the current page with its filter
        assert!(html.contains("?page=2&amp;search=foo%20bar&amp;completed=true"));
        // paging keeps the filter on both neighbours
        assert!(html.contains("/tasks/fragment?page=1&amp;search=foo%20bar&amp;completed=true"));
        assert!(html.contains("/tasks/fragment?page=3&amp;search=foo%20bar&amp;completed=true"));
    }

    #[test]
    fn unfiltered_links_carry_only_the_page() {
        let html = task_list(&page_with(vec![task("plain")], 1, 2), &FilterOptions::new());
        assert!(html.contains("?page=1\""));
        assert!(html.contains("/tasks/fragment?page=2\""));
        assert!(!html.contains("search="));
        assert!(!html.contains("completed="));
    }

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!(encode_query_value("a b&c=d?e"), "a%20b%26c%3Dd%3Fe");
        assert_eq!(encode_query_value("plain-text_0.9~"), "plain-text_0.9~");
    }
}
