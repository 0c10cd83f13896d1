// src/teletext_ui/page_builder.rs - Pages built from stream data

use super::core::TeletextPage;
use crate::constants::ui::PAGE_NUMBER;
use crate::data_fetcher::models::{SeasonDetail, SeasonId};
use crate::data_fetcher::policy::{ErrorClassification, ErrorKind};
use crate::data_fetcher::processors::{SortState, format_date_time};

const PAGE_TITLE: &str = "番组排名";

/// Subheader naming the season and the active ordering, e.g. `2025年4月 评分↓`.
pub fn season_subheader(season_id: SeasonId, sort: &SortState) -> String {
    format!("{} {}", season_id.display_name(), sort.describe())
}

/// Creates a ranking page for one season, rows ordered by `sort`.
///
/// `interactive` pages paginate to the terminal and show the footer;
/// otherwise every row lands on one plain page.
pub fn build_ranking_page(
    detail: &SeasonDetail,
    sort: &SortState,
    interactive: bool,
    current_page: Option<usize>,
) -> TeletextPage {
    let mut page = TeletextPage::new(
        PAGE_NUMBER,
        PAGE_TITLE.to_string(),
        season_subheader(detail.season_id, sort),
        interactive,
        !interactive,
    );

    if !detail.updated_at.trim().is_empty() {
        page.set_updated_at(Some(format_date_time(&detail.updated_at)));
    }

    if detail.subjects.is_empty() {
        page.add_notice("本季度暂无排名数据");
    } else {
        page.add_subjects(&sort.apply(&detail.subjects));
        page.add_notice(&format!(
            "共 {} 部，已排名 {} 部",
            detail.subjects.len(),
            detail.ranked_count()
        ));
    }

    // Set the current page AFTER content is added (so total_pages() is correct)
    if let Some(page_num) = current_page {
        page.set_current_page(page_num);
    }

    page
}

/// Placeholder page shown while a season loads.
pub fn build_loading_page(season_id: Option<SeasonId>, sort: &SortState) -> TeletextPage {
    let subheader = match season_id {
        Some(id) => season_subheader(id, sort),
        None => String::new(),
    };
    let mut page = TeletextPage::new(PAGE_NUMBER, PAGE_TITLE.to_string(), subheader, true, false);

    let message = match season_id {
        Some(id) => format!("正在加载 {} 的排名...", id.display_name()),
        None => "正在加载季度列表...".to_string(),
    };
    page.add_notice(&message);
    page.show_loading("加载中");
    page
}

/// Page describing a failed load. Retryable failures mention the retry key
/// when `interactive`.
pub fn build_error_page(
    season_id: Option<SeasonId>,
    sort: &SortState,
    error: &ErrorClassification,
    interactive: bool,
) -> TeletextPage {
    let subheader = match season_id {
        Some(id) => season_subheader(id, sort),
        None => String::new(),
    };
    let mut page = TeletextPage::new(
        PAGE_NUMBER,
        PAGE_TITLE.to_string(),
        subheader,
        interactive,
        !interactive,
    );

    let headline = match (error.kind, error.status) {
        (ErrorKind::Network, _) => "网络连接失败".to_string(),
        (ErrorKind::Cors, _) => "请求被跨域策略拒绝".to_string(),
        (ErrorKind::Api, Some(404)) => "未找到该季度的数据".to_string(),
        (ErrorKind::Api, Some(status)) => format!("接口返回错误 (HTTP {status})"),
        (ErrorKind::Api, None) => "接口返回了无法使用的数据".to_string(),
        (ErrorKind::Unknown, _) => "加载失败".to_string(),
    };
    page.add_error_message(&headline);
    page.add_error_message(&error.message);

    if interactive {
        if error.retryable {
            page.add_notice("按 t 重试，按 r 强制刷新");
        } else {
            page.add_notice("按 ↑↓ 切换季度，按 r 强制刷新");
        }
    }
    page.set_error_warning(true);
    page
}
