use crate::value_objects::{Pagination, TaskFilter};

/// 构建 `/api/tasks` 系列接口的查询参数
///
/// 过滤字段为空时整个参数省略，空字符串会被服务端当作精确匹配条件。
pub struct TaskQueryBuilder;

impl TaskQueryBuilder {
    pub fn build_list_params(
        filter: &TaskFilter,
        pagination: &Pagination,
        days: Option<u32>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), pagination.page.to_string()),
            ("size".to_string(), pagination.size.to_string()),
        ];

        if let Some(job_code) = filter.job_code() {
            params.push(("jobCode".to_string(), job_code.to_string()));
        }

        if let Some(status) = filter.status() {
            params.push(("status".to_string(), status.to_string()));
        }

        if let Some(days) = days {
            params.push(("days".to_string(), days.to_string()));
        }

        params
    }

    /// 概览页"最近任务"：第 0 页，按创建时间倒序
    pub fn build_recent_params(limit: u32, days: Option<u32>) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), "0".to_string()),
            ("size".to_string(), limit.to_string()),
        ];
        if let Some(days) = days {
            params.push(("days".to_string(), days.to_string()));
        }
        params
    }

    pub fn build_stats_params(days: Option<u32>) -> Vec<(String, String)> {
        days.map(|d| vec![("days".to_string(), d.to_string())])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &[(String, String)]) -> Vec<&str> {
        params.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_omits_constraints() {
        let params =
            TaskQueryBuilder::build_list_params(&TaskFilter::default(), &Pagination::new(20), None);
        assert_eq!(keys(&params), vec!["page", "size"]);
    }

    #[test]
    fn test_filter_fields_forwarded() {
        let mut pagination = Pagination::new(50);
        pagination.page = 3;
        let params = TaskQueryBuilder::build_list_params(
            &TaskFilter::new("orders", "RUNNING"),
            &pagination,
            Some(7),
        );
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "3".to_string()),
                ("size".to_string(), "50".to_string()),
                ("jobCode".to_string(), "orders".to_string()),
                ("status".to_string(), "RUNNING".to_string()),
                ("days".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_only() {
        let params = TaskQueryBuilder::build_list_params(
            &TaskFilter::new("", "FAILED"),
            &Pagination::new(20),
            None,
        );
        assert_eq!(keys(&params), vec!["page", "size", "status"]);
    }

    #[test]
    fn test_stats_params() {
        assert!(TaskQueryBuilder::build_stats_params(None).is_empty());
        assert_eq!(
            TaskQueryBuilder::build_stats_params(Some(30)),
            vec![("days".to_string(), "30".to_string())]
        );
    }
}
