//! 数据传输对象 (DTO)
//!
//! 创建接口接收的请求体结构，以及插入前的字段校验。

use serde::{Deserialize, Serialize};

/// 评分允许的范围
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 0..=10;

/// 用于插入游戏的数据结构
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertGameData {
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub price: i32,
}

impl InsertGameData {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title 不能为空".to_string());
        }
        if self.price < 0 {
            return Err(format!("price 不能为负数: {}", self.price));
        }
        Ok(())
    }
}

/// 用于插入评测的数据结构
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReviewData {
    pub score: i32,
    pub comment: String,
    pub game_id: i32,
    pub user_id: i32,
}

impl InsertReviewData {
    pub fn validate(&self) -> Result<(), String> {
        if !SCORE_RANGE.contains(&self.score) {
            return Err(format!(
                "score 必须在 {}..={} 之间: {}",
                SCORE_RANGE.start(),
                SCORE_RANGE.end(),
                self.score
            ));
        }
        Ok(())
    }
}

/// 用于插入用户的数据结构
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertUserData {
    pub name: String,
}

impl InsertUserData {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name 不能为空".to_string());
        }
        Ok(())
    }
}

/// 用于插入 newsletter 的数据结构（表单提交）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertNewsletterData {
    pub title: String,
    pub body: String,
}
