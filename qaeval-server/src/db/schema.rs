//! Schema creation
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS`; the circular and
//! self-referencing foreign keys plus the score range check are added
//! afterwards with named `ALTER TABLE ... ADD CONSTRAINT` statements. Running
//! this twice is safe: duplicate-constraint errors are reported as
//! already present.

use serde::Serialize;
use sqlx::MySqlPool;
use tracing::{info, warn};

/// Named DDL statement
pub struct Statement {
    pub name: &'static str,
    pub sql: &'static str,
}

pub const TABLES: &[Statement] = &[
    Statement {
        name: "User",
        sql: r#"
        CREATE TABLE IF NOT EXISTS User (
            user_id INT PRIMARY KEY AUTO_INCREMENT,
            username VARCHAR(50) NOT NULL UNIQUE,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            role VARCHAR(20) NOT NULL DEFAULT 'guest' CHECK (role IN ('admin', 'evaluator', 'guest')),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_login DATETIME NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "user_login_history",
        sql: r#"
        CREATE TABLE IF NOT EXISTS user_login_history (
            login_id INT PRIMARY KEY AUTO_INCREMENT,
            user_id INT NOT NULL,
            login_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            success BOOLEAN NOT NULL DEFAULT TRUE,
            FOREIGN KEY (user_id) REFERENCES User(user_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "ori_qs",
        sql: r#"
        CREATE TABLE IF NOT EXISTS ori_qs (
            ori_qs_id INT PRIMARY KEY AUTO_INCREMENT,
            content TEXT NOT NULL,
            source VARCHAR(255) NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "ori_ans",
        sql: r#"
        CREATE TABLE IF NOT EXISTS ori_ans (
            ori_ans_id INT PRIMARY KEY AUTO_INCREMENT,
            ori_qs_id INT NOT NULL,
            content TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (ori_qs_id) REFERENCES ori_qs(ori_qs_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "tags",
        sql: r#"
        CREATE TABLE IF NOT EXISTS tags (
            tag_id INT PRIMARY KEY AUTO_INCREMENT,
            name VARCHAR(50) NOT NULL UNIQUE
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "updated_content",
        sql: r#"
        CREATE TABLE IF NOT EXISTS updated_content (
            updated_content_version INT PRIMARY KEY AUTO_INCREMENT,
            content TEXT NOT NULL,
            operation VARCHAR(50) NOT NULL,
            created_by INT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (created_by) REFERENCES User(user_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "llm_type",
        sql: r#"
        CREATE TABLE IF NOT EXISTS llm_type (
            llm_type_id INT PRIMARY KEY AUTO_INCREMENT,
            name VARCHAR(100) NOT NULL UNIQUE,
            params BIGINT NOT NULL,
            costs_per_million_token DECIMAL(10,2) NOT NULL
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "standard_ans",
        sql: r#"
        CREATE TABLE IF NOT EXISTS standard_ans (
            ans_id INT PRIMARY KEY AUTO_INCREMENT,
            ans_content TEXT NOT NULL,
            ori_ans_id INT NOT NULL UNIQUE,
            eval_id INT NULL,
            std_ans_id INT NULL,
            std_qs_id INT NULL,
            updated_content_version INT NOT NULL,
            created_by INT NULL,
            approved_by INT NULL,
            status ENUM('draft', 'review', 'approved', 'archived') NOT NULL DEFAULT 'draft',
            quality_score DECIMAL(4,2) NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            FOREIGN KEY (ori_ans_id) REFERENCES ori_ans(ori_ans_id),
            FOREIGN KEY (updated_content_version) REFERENCES updated_content(updated_content_version),
            FOREIGN KEY (created_by) REFERENCES User(user_id),
            FOREIGN KEY (approved_by) REFERENCES User(user_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "llm_evaluation",
        sql: r#"
        CREATE TABLE IF NOT EXISTS llm_evaluation (
            eval_id INT PRIMARY KEY AUTO_INCREMENT,
            llm_answer TEXT NOT NULL,
            llm_type_id INT NOT NULL,
            std_ans_id INT NOT NULL,
            llm_score DECIMAL(5,2) NOT NULL,
            notes VARCHAR(255) NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (llm_type_id) REFERENCES llm_type(llm_type_id),
            FOREIGN KEY (std_ans_id) REFERENCES standard_ans(ans_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "standard_QS",
        sql: r#"
        CREATE TABLE IF NOT EXISTS standard_QS (
            std_qs_id INT PRIMARY KEY AUTO_INCREMENT,
            content TEXT NOT NULL,
            ori_qs_id INT NOT NULL UNIQUE,
            tag_id INT NOT NULL,
            std_ans_id INT NULL,
            version INT NOT NULL DEFAULT 1,
            updated_content_version INT NOT NULL,
            created_by INT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (ori_qs_id) REFERENCES ori_qs(ori_qs_id),
            FOREIGN KEY (tag_id) REFERENCES tags(tag_id),
            FOREIGN KEY (updated_content_version) REFERENCES updated_content(updated_content_version),
            FOREIGN KEY (created_by) REFERENCES User(user_id)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
    Statement {
        name: "standard_pair",
        sql: r#"
        CREATE TABLE IF NOT EXISTS standard_pair (
            pair_id INT PRIMARY KEY AUTO_INCREMENT,
            std_qs_id INT NOT NULL,
            std_ans_id INT NOT NULL,
            eval_id INT NOT NULL,
            updated_content_version INT NOT NULL,
            FOREIGN KEY (std_qs_id) REFERENCES standard_QS(std_qs_id),
            FOREIGN KEY (std_ans_id) REFERENCES standard_ans(ans_id),
            FOREIGN KEY (eval_id) REFERENCES llm_evaluation(eval_id),
            FOREIGN KEY (updated_content_version) REFERENCES updated_content(updated_content_version)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    },
];

pub const CONSTRAINTS: &[Statement] = &[
    Statement {
        name: "fk_std_ans_eval",
        sql: "ALTER TABLE standard_ans ADD CONSTRAINT fk_std_ans_eval \
              FOREIGN KEY (eval_id) REFERENCES llm_evaluation(eval_id)",
    },
    Statement {
        name: "fk_std_ans_self",
        sql: "ALTER TABLE standard_ans ADD CONSTRAINT fk_std_ans_self \
              FOREIGN KEY (std_ans_id) REFERENCES standard_ans(ans_id)",
    },
    Statement {
        name: "fk_std_ans_qs",
        sql: "ALTER TABLE standard_ans ADD CONSTRAINT fk_std_ans_qs \
              FOREIGN KEY (std_qs_id) REFERENCES standard_QS(std_qs_id)",
    },
    Statement {
        name: "fk_std_qs_ans",
        sql: "ALTER TABLE standard_QS ADD CONSTRAINT fk_std_qs_ans \
              FOREIGN KEY (std_ans_id) REFERENCES standard_ans(ans_id)",
    },
    Statement {
        name: "chk_llm_score_range",
        sql: "ALTER TABLE llm_evaluation ADD CONSTRAINT chk_llm_score_range \
              CHECK (llm_score >= 0 AND llm_score <= 100)",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    Applied,
    AlreadyPresent,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementOutcome {
    pub name: &'static str,
    pub status: StatementStatus,
    pub message: String,
}

/// Summary of a schema run
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    pub success: bool,
    pub statements: Vec<StatementOutcome>,
}

impl SchemaReport {
    pub fn failures(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.statements
            .iter()
            .filter(|s| s.status == StatementStatus::Failed)
    }
}

/// MySQL reports re-added constraints as 1826 / 3822 / 1022 / 1061.
fn is_duplicate_constraint(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("duplicate") || lower.contains("already exists")
}

/// Run every table and constraint statement, continuing past failures.
pub async fn create_tables(pool: &MySqlPool) -> SchemaReport {
    let mut statements = Vec::with_capacity(TABLES.len() + CONSTRAINTS.len());

    for stmt in TABLES {
        let outcome = match sqlx::query(stmt.sql).execute(pool).await {
            Ok(_) => StatementOutcome {
                name: stmt.name,
                status: StatementStatus::Applied,
                message: format!("table {} ready", stmt.name),
            },
            Err(e) => {
                warn!(table = stmt.name, error = %e, "create table failed");
                StatementOutcome {
                    name: stmt.name,
                    status: StatementStatus::Failed,
                    message: e.to_string(),
                }
            }
        };
        statements.push(outcome);
    }

    for stmt in CONSTRAINTS {
        let outcome = match sqlx::query(stmt.sql).execute(pool).await {
            Ok(_) => StatementOutcome {
                name: stmt.name,
                status: StatementStatus::Applied,
                message: format!("constraint {} added", stmt.name),
            },
            Err(e) if is_duplicate_constraint(&e.to_string()) => StatementOutcome {
                name: stmt.name,
                status: StatementStatus::AlreadyPresent,
                message: format!("constraint {} already present", stmt.name),
            },
            Err(e) => {
                warn!(constraint = stmt.name, error = %e, "add constraint failed");
                StatementOutcome {
                    name: stmt.name,
                    status: StatementStatus::Failed,
                    message: e.to_string(),
                }
            }
        };
        statements.push(outcome);
    }

    let success = statements
        .iter()
        .all(|s| s.status != StatementStatus::Failed);
    info!(success, statements = statements.len(), "schema run complete");

    SchemaReport {
        success,
        statements,
    }
}
