//! Named report queries
//!
//! Fixed, parameter-free SQL run through the paginator. Column aliases are
//! unique per query because the paginator wraps each one in a derived table.

use qaeval_core::{Page, Pagination};
use serde::Serialize;
use sqlx::MySqlPool;

use crate::db::paginate::paginate;
use crate::db::rows::JsonRow;
use crate::db::DbError;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Report {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub sql: &'static str,
}

pub const REPORTS: &[Report] = &[
    Report {
        name: "raw-questions",
        description: "Imported questions, newest first",
        sql: "SELECT ori_qs_id, content, source, created_at FROM ori_qs ORDER BY created_at DESC, ori_qs_id DESC",
    },
    Report {
        name: "raw-answers",
        description: "Imported answers with their question",
        sql: r#"
            SELECT oa.ori_ans_id, oa.content AS answer_content, oq.ori_qs_id, oq.content AS question_content, oa.created_at
            FROM ori_ans oa
            JOIN ori_qs oq ON oa.ori_qs_id = oq.ori_qs_id
            ORDER BY oa.created_at DESC, oa.ori_ans_id DESC
        "#,
    },
    Report {
        name: "unannotated-answers",
        description: "Raw answers with no standard answer yet",
        sql: r#"
            SELECT oa.ori_ans_id, oa.content AS answer_content, oq.content AS question_content
            FROM ori_ans oa
            JOIN ori_qs oq ON oa.ori_qs_id = oq.ori_qs_id
            LEFT JOIN standard_ans sa ON sa.ori_ans_id = oa.ori_ans_id
            WHERE sa.ans_id IS NULL
            ORDER BY oa.ori_ans_id
        "#,
    },
    Report {
        name: "standard-answers",
        description: "Curated answers with status, creator and approver",
        sql: r#"
            SELECT sa.ans_id, sa.ans_content, sa.ori_ans_id, CAST(sa.status AS CHAR) AS status,
                   sa.quality_score, cu.username AS created_by, au.username AS approved_by, sa.updated_at
            FROM standard_ans sa
            LEFT JOIN User cu ON sa.created_by = cu.user_id
            LEFT JOIN User au ON sa.approved_by = au.user_id
            ORDER BY sa.updated_at DESC, sa.ans_id DESC
        "#,
    },
    Report {
        name: "standard-questions",
        description: "Curated questions with tag and version",
        sql: r#"
            SELECT sq.std_qs_id, sq.content, t.name AS tag, sq.version, u.username AS created_by, sq.created_at
            FROM standard_QS sq
            JOIN tags t ON sq.tag_id = t.tag_id
            LEFT JOIN User u ON sq.created_by = u.user_id
            ORDER BY sq.std_qs_id
        "#,
    },
    Report {
        name: "tag-usage",
        description: "Standard questions per tag",
        sql: r#"
            SELECT t.tag_id, t.name AS tag, COUNT(sq.std_qs_id) AS questions
            FROM tags t
            LEFT JOIN standard_QS sq ON sq.tag_id = t.tag_id
            GROUP BY t.tag_id, t.name
            ORDER BY questions DESC, t.name
        "#,
    },
    Report {
        name: "score-buckets",
        description: "LLM scores grouped into grade bands",
        sql: r#"
            SELECT bucket, COUNT(*) AS evaluations
            FROM (
                SELECT CASE
                    WHEN llm_score >= 90 THEN 'excellent (90-100)'
                    WHEN llm_score >= 75 THEN 'good (75-89)'
                    WHEN llm_score >= 60 THEN 'pass (60-74)'
                    ELSE 'fail (0-59)'
                END AS bucket
                FROM llm_evaluation
            ) AS graded
            GROUP BY bucket
            ORDER BY bucket
        "#,
    },
    Report {
        name: "model-leaderboard",
        description: "Judge models ranked by average score",
        sql: r#"
            SELECT lt.name AS model, COUNT(le.eval_id) AS evaluations,
                   CAST(AVG(le.llm_score) AS DOUBLE) AS avg_score
            FROM llm_type lt
            JOIN llm_evaluation le ON le.llm_type_id = lt.llm_type_id
            GROUP BY lt.llm_type_id, lt.name
            ORDER BY avg_score DESC
        "#,
    },
    Report {
        name: "evaluations-per-answer",
        description: "How often each standard answer was scored",
        sql: r#"
            SELECT sa.ans_id, COUNT(le.eval_id) AS evaluations,
                   CAST(AVG(le.llm_score) AS DOUBLE) AS avg_score
            FROM standard_ans sa
            LEFT JOIN llm_evaluation le ON le.std_ans_id = sa.ans_id
            GROUP BY sa.ans_id
            ORDER BY evaluations DESC, sa.ans_id
        "#,
    },
    Report {
        name: "standard-pairs",
        description: "Curated question/answer pairs with tag",
        sql: r#"
            SELECT sp.pair_id, sq.content AS question, sa.ans_content AS answer, t.name AS tag
            FROM standard_pair sp
            JOIN standard_QS sq ON sp.std_qs_id = sq.std_qs_id
            JOIN standard_ans sa ON sp.std_ans_id = sa.ans_id
            JOIN tags t ON sq.tag_id = t.tag_id
            ORDER BY sp.pair_id
        "#,
    },
    Report {
        name: "annotator-activity",
        description: "Standard answers created and approved per user",
        sql: r#"
            SELECT u.user_id, u.username,
                   (SELECT COUNT(*) FROM standard_ans c WHERE c.created_by = u.user_id) AS created,
                   (SELECT COUNT(*) FROM standard_ans a WHERE a.approved_by = u.user_id) AS approved
            FROM User u
            ORDER BY created DESC, u.username
        "#,
    },
    Report {
        name: "recent-changes",
        description: "Audit trail of content changes",
        sql: r#"
            SELECT uc.updated_content_version, uc.operation, uc.content, u.username AS changed_by, uc.created_at
            FROM updated_content uc
            LEFT JOIN User u ON uc.created_by = u.user_id
            ORDER BY uc.created_at DESC, uc.updated_content_version DESC
        "#,
    },
    Report {
        name: "quality-buckets",
        description: "Standard answers grouped by annotator quality score",
        sql: r#"
            SELECT bucket, COUNT(*) AS answers
            FROM (
                SELECT CASE
                    WHEN quality_score IS NULL THEN 'unscored'
                    WHEN quality_score >= 4 THEN 'high (4-5)'
                    WHEN quality_score >= 2.5 THEN 'medium (2.5-4)'
                    ELSE 'low (0-2.5)'
                END AS bucket
                FROM standard_ans
            ) AS graded
            GROUP BY bucket
            ORDER BY bucket
        "#,
    },
    Report {
        name: "model-costs",
        description: "Judge model size, price and usage",
        sql: r#"
            SELECT lt.name AS model, lt.params, lt.costs_per_million_token,
                   COUNT(le.eval_id) AS evaluations
            FROM llm_type lt
            LEFT JOIN llm_evaluation le ON le.llm_type_id = lt.llm_type_id
            GROUP BY lt.llm_type_id, lt.name, lt.params, lt.costs_per_million_token
            ORDER BY lt.costs_per_million_token DESC
        "#,
    },
    Report {
        name: "unevaluated-answers",
        description: "Standard answers no model has scored",
        sql: r#"
            SELECT sa.ans_id, sa.ans_content, CAST(sa.status AS CHAR) AS status
            FROM standard_ans sa
            WHERE NOT EXISTS (SELECT 1 FROM llm_evaluation le WHERE le.std_ans_id = sa.ans_id)
            ORDER BY sa.ans_id
        "#,
    },
    Report {
        name: "questions-without-standard",
        description: "Raw questions not yet curated",
        sql: r#"
            SELECT oq.ori_qs_id, oq.content, oq.source
            FROM ori_qs oq
            LEFT JOIN standard_QS sq ON sq.ori_qs_id = oq.ori_qs_id
            WHERE sq.std_qs_id IS NULL
            ORDER BY oq.ori_qs_id
        "#,
    },
    Report {
        name: "role-distribution",
        description: "Accounts per role, total and active",
        sql: r#"
            SELECT CAST(role AS CHAR) AS role, COUNT(*) AS users,
                   COUNT(CASE WHEN is_active = TRUE THEN 1 END) AS active_users
            FROM User
            GROUP BY role
            ORDER BY users DESC
        "#,
    },
    Report {
        name: "daily-logins",
        description: "Successful and failed logins per day",
        sql: r#"
            SELECT DATE(login_at) AS day,
                   COUNT(CASE WHEN success = TRUE THEN 1 END) AS successful,
                   COUNT(CASE WHEN success = FALSE THEN 1 END) AS failed
            FROM user_login_history
            GROUP BY DATE(login_at)
            ORDER BY day DESC
        "#,
    },
    Report {
        name: "tag-scores",
        description: "Average LLM score per tag",
        sql: r#"
            SELECT t.name AS tag, COUNT(le.eval_id) AS evaluations,
                   CAST(AVG(le.llm_score) AS DOUBLE) AS avg_score
            FROM standard_pair sp
            JOIN standard_QS sq ON sp.std_qs_id = sq.std_qs_id
            JOIN tags t ON sq.tag_id = t.tag_id
            JOIN llm_evaluation le ON le.std_ans_id = sp.std_ans_id
            GROUP BY t.tag_id, t.name
            ORDER BY avg_score DESC
        "#,
    },
    Report {
        name: "model-disagreement",
        description: "Answers where judge models disagree most",
        sql: r#"
            SELECT le.std_ans_id, COUNT(DISTINCT le.llm_type_id) AS models,
                   CAST(MAX(le.llm_score) - MIN(le.llm_score) AS DOUBLE) AS score_spread
            FROM llm_evaluation le
            GROUP BY le.std_ans_id
            HAVING COUNT(DISTINCT le.llm_type_id) > 1
            ORDER BY score_spread DESC, le.std_ans_id
        "#,
    },
];

pub fn find(name: &str) -> Option<&'static Report> {
    REPORTS.iter().find(|r| r.name == name)
}

/// Run a named report. Unknown names are not found.
pub async fn run(pool: &MySqlPool, name: &str, pagination: Pagination) -> Result<Page<JsonRow>, DbError> {
    let report = find(name).ok_or_else(|| DbError::not_found("report", name))?;
    paginate(pool, report.sql, &[], pagination).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_twenty_unique_reports() {
        assert_eq!(REPORTS.len(), 20);
        let names: HashSet<_> = REPORTS.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), REPORTS.len());
    }

    #[test]
    fn reports_are_parameter_free_selects() {
        for report in REPORTS {
            assert!(report.sql.trim_start().starts_with("SELECT"), "{}", report.name);
            assert!(!report.sql.contains('?'), "{}", report.name);
            assert!(!report.sql.contains(';'), "{}", report.name);
        }
    }

    #[test]
    fn find_by_name() {
        assert!(find("tag-usage").is_some());
        assert!(find("drop-everything").is_none());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn every_report_executes() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::schema::create_tables(&pool).await;
        for report in REPORTS {
            run(&pool, report.name, Pagination::new(1, 5))
                .await
                .unwrap_or_else(|e| panic!("{}: {e}", report.name));
        }
    }
}
