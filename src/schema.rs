//! PostgreSQL 初始化 DDL（`init` 命令执行，幂等）
//!
//! 所有业务表共享同一 schema，通过 `tenant_id` 列区分租户。

/// 审计字段，所有业务表共用
macro_rules! core_columns {
    () => {
        "id BIGSERIAL PRIMARY KEY,
        tenant_id VARCHAR(63) NOT NULL DEFAULT 'public',
        description VARCHAR(255),
        creator BIGINT,
        modifier VARCHAR(255),
        dept_belong_id BIGINT,
        create_datetime TIMESTAMPTZ NOT NULL DEFAULT now(),
        update_datetime TIMESTAMPTZ NOT NULL DEFAULT now(),
        is_deleted BOOLEAN NOT NULL DEFAULT FALSE,"
    };
}

pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS sys_tenant (
        id BIGSERIAL PRIMARY KEY,
        schema_name VARCHAR(63) NOT NULL UNIQUE,
        name VARCHAR(100) NOT NULL,
        domain VARCHAR(253) UNIQUE,
        create_datetime TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    concat!(
        "CREATE TABLE IF NOT EXISTS sys_users (",
        core_columns!(),
        "
        username VARCHAR(150) NOT NULL,
        email VARCHAR(255),
        mobile VARCHAR(255),
        avatar VARCHAR(255),
        name VARCHAR(40) NOT NULL,
        gender INTEGER NOT NULL DEFAULT 0,
        user_type INTEGER NOT NULL DEFAULT 0,
        password_hash VARCHAR(128) NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
        role_ids BIGINT[] NOT NULL DEFAULT '{}',
        dept_id BIGINT,
        login_error_count INTEGER NOT NULL DEFAULT 0,
        pwd_change_count INTEGER NOT NULL DEFAULT 0,
        last_login TIMESTAMPTZ
    )"
    ),
    "CREATE UNIQUE INDEX IF NOT EXISTS sys_users_username_uniq
        ON sys_users (tenant_id, username) WHERE NOT is_deleted",
    concat!(
        "CREATE TABLE IF NOT EXISTS sys_role (",
        core_columns!(),
        "
        name VARCHAR(64) NOT NULL,
        key VARCHAR(64) NOT NULL,
        sort INTEGER NOT NULL DEFAULT 1,
        status BOOLEAN NOT NULL DEFAULT TRUE
    )"
    ),
    "CREATE UNIQUE INDEX IF NOT EXISTS sys_role_key_uniq
        ON sys_role (tenant_id, key) WHERE NOT is_deleted",
    concat!(
        "CREATE TABLE IF NOT EXISTS sys_dept (",
        core_columns!(),
        "
        name VARCHAR(64) NOT NULL,
        key VARCHAR(64),
        sort INTEGER NOT NULL DEFAULT 1,
        owner VARCHAR(32),
        phone VARCHAR(32),
        email VARCHAR(255),
        status BOOLEAN NOT NULL DEFAULT TRUE,
        parent_id BIGINT
    )"
    ),
    "CREATE UNIQUE INDEX IF NOT EXISTS sys_dept_key_uniq
        ON sys_dept (tenant_id, key) WHERE NOT is_deleted AND key IS NOT NULL",
    concat!(
        "CREATE TABLE IF NOT EXISTS sys_system_config (",
        core_columns!(),
        "
        parent_id BIGINT,
        title VARCHAR(50) NOT NULL,
        key VARCHAR(100) NOT NULL,
        value JSONB,
        sort INTEGER NOT NULL DEFAULT 0,
        status BOOLEAN NOT NULL DEFAULT TRUE,
        data_options JSONB,
        form_item_type INTEGER DEFAULT 0,
        rule JSONB,
        placeholder VARCHAR(50),
        setting JSONB
    )"
    ),
    "CREATE UNIQUE INDEX IF NOT EXISTS sys_system_config_key_uniq
        ON sys_system_config (tenant_id, key, COALESCE(parent_id, 0)) WHERE NOT is_deleted",
    concat!(
        "CREATE TABLE IF NOT EXISTS sys_operation_log (",
        core_columns!(),
        "
        request_modular VARCHAR(64),
        request_path VARCHAR(400),
        request_body TEXT,
        request_method VARCHAR(8),
        request_msg TEXT,
        request_ip VARCHAR(32),
        request_browser VARCHAR(64),
        response_code VARCHAR(32),
        request_os VARCHAR(64),
        json_result TEXT,
        status BOOLEAN NOT NULL DEFAULT FALSE
    )"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS sys_login_log (",
        core_columns!(),
        "
        username VARCHAR(150) NOT NULL,
        ip VARCHAR(32) NOT NULL,
        agent TEXT NOT NULL,
        browser VARCHAR(200) NOT NULL,
        os VARCHAR(200) NOT NULL,
        login_type INTEGER NOT NULL DEFAULT 1
    )"
    ),
];

#[cfg(test)]
mod tests {
    use super::CREATE_TABLES;

    #[test]
    fn test_every_business_table_has_audit_columns() {
        for ddl in CREATE_TABLES
            .iter()
            .filter(|sql| sql.starts_with("CREATE TABLE") && !sql.contains("sys_tenant"))
        {
            assert!(ddl.contains("tenant_id"), "{}", ddl);
            assert!(ddl.contains("is_deleted"), "{}", ddl);
        }
    }
}
