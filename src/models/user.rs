/// 学生资料
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    /// 可能为空（没有邮箱权限时）
    pub email: String,
}
