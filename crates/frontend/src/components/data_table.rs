//! Plain text table with a quick filter

use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DataTableProps {
    pub headers: Vec<AttrValue>,
    pub rows: Vec<Vec<String>>,
    #[prop_or_default]
    pub loading: bool,
    #[prop_or(AttrValue::Static("No records found"))]
    pub empty_text: AttrValue,
    /// Show a filter box that matches any cell, case-insensitively
    #[prop_or_default]
    pub filterable: bool,
}

/// Rows with a cell containing `needle`, ignoring case
pub fn filter_rows<'a>(rows: &'a [Vec<String>], needle: &str) -> Vec<&'a Vec<String>> {
    let needle = needle.trim().to_lowercase();
    rows.iter()
        .filter(|row| {
            needle.is_empty() || row.iter().any(|cell| cell.to_lowercase().contains(&needle))
        })
        .collect()
}

#[function_component(DataTable)]
pub fn data_table(props: &DataTableProps) -> Html {
    let filter = use_state(String::new);

    let on_filter = {
        let filter = filter.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            filter.set(input.value());
        })
    };

    let visible = filter_rows(&props.rows, &filter);

    html! {
        <div class="bg-white rounded-lg border border-gray-200 overflow-hidden">
            if props.filterable {
                <div class="p-3 border-b border-gray-200">
                    <input
                        type="text"
                        placeholder="Search..."
                        value={(*filter).clone()}
                        oninput={on_filter}
                        class="w-64 px-3 py-1.5 text-sm border border-gray-300 rounded"
                    />
                </div>
            }
            <div class="overflow-x-auto">
                <table class="min-w-full text-sm">
                    <thead class="bg-gray-50">
                        <tr>
                            { for props.headers.iter().map(|header| html! {
                                <th class="px-3 py-2 text-left font-semibold text-gray-700 whitespace-nowrap">{header.clone()}</th>
                            }) }
                        </tr>
                    </thead>
                    <tbody>
                        if props.loading {
                            <tr><td class="px-3 py-6 text-center text-gray-500" colspan={props.headers.len().to_string()}>{"Loading..."}</td></tr>
                        } else if visible.is_empty() {
                            <tr><td class="px-3 py-6 text-center text-gray-500" colspan={props.headers.len().to_string()}>{props.empty_text.clone()}</td></tr>
                        } else {
                            { for visible.into_iter().map(|row| html! {
                                <tr class="border-t border-gray-100 hover:bg-gray-50">
                                    { for row.iter().map(|cell| html! {
                                        <td class="px-3 py-2 text-gray-800 whitespace-nowrap">{cell.clone()}</td>
                                    }) }
                                </tr>
                            }) }
                        }
                    </tbody>
                </table>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_any_cell_ignoring_case() {
        let rows = vec![
            vec!["R1-0-0".to_string(), "TRAY-9".to_string()],
            vec!["R2-0-1".to_string(), "N/A".to_string()],
        ];
        assert_eq!(filter_rows(&rows, "tray").len(), 1);
        assert_eq!(filter_rows(&rows, "  ").len(), 2);
        assert!(filter_rows(&rows, "R3").is_empty());
    }
}
