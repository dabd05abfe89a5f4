use crate::domain::model::Field;

/// Grafana `_source` 欄位，順序即 CSV 列順序
pub const DASHBOARD_FIELDS: &[Field] = &[
    Field::new("@timestamp", "时间戳"),
    Field::new("db_name", "数据库"),
    Field::new("db_user", "数据库用户名"),
    Field::new("lock_time", "锁等待时间"),
    Field::new("query_time", "查询耗时"),
    Field::new("rows_examined", "扫描行数"),
    Field::new("rows_sent", "返回行数"),
    Field::new("sql_statement", "SQL语句"),
    Field::new("message", "日志消息"),
];

/// RDS `SQLSlowRecord` 欄位
pub const CLOUD_PROVIDER_FIELDS: &[Field] = &[
    Field::new("ExecutionStartTime", "执行开始时间"),
    Field::new("DBName", "数据库"),
    Field::new("LockTimes", "锁等待时间"),
    Field::new("QueryTimes", "查询耗时"),
    Field::new("ParseRowCounts", "解析行数"),
    Field::new("ReturnRowCounts", "返回行数"),
    Field::new("SQLText", "SQL语句"),
    Field::new("HostAddress", "数据库客户端及地址"),
    Field::new("QueryTimeMS", "查询时间（毫秒）"),
    Field::new("SQLHash", "SQL唯一标识"),
];
