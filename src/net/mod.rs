//! # 区间时间开放工作流网 (Interval-Timed Open Workflow Net)
//!
//! 设库所集合  P  与迁移集合  T ,输入/输出映射  Pre, Post ∈ ℕ^{|P|×|T|} .
//! 每个迁移  t ∈ T  携带发生区间  [eft(t), lft(t)] ,  lft  可为无穷;
//! 每个库所  p ∈ P  携带容量界  b(p) ( 0  表示无界).
//! 网状态为有序对  (M, ν) ,其中  M ∈ ℕ^{|P|}  为库所标识, ν  为时钟标识:
//!
//! * 迁移  t  库所使能当且仅当  ∀p: M[p] ≥ Pre[p, t] ;非使能迁移的时钟取
//!   哨兵值  # (Disabled);
//! * 迁移  t  可发生当且仅当其库所使能且  ν[t] ≥ eft(t) ;
//! * 发生后  M' = M - Pre[:, t] + Post[:, t] ,且所有前集库所后集中的迁移
//!   时钟复位为 0,新近使能的迁移时钟置 0,失去使能的迁移置  # ;
//! * 单位时间步可行当且仅当  ∀t  库所使能:  ν[t] + 1 ≤ lft(t) .
//!
//! 接口库所(输入/输出)表示与环境的异步消息交换;最大网变换
//! ([`maximal::construct_maximal_net`]) 为每个接口库所补全环境迁移,
//! 使发生规则无须区分接口库所.

pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod maximal;
pub mod rule;
pub mod state;
pub mod structure;

pub use self::core::{Net, NetError};
pub use ids::{PlaceId, TransitionId};
pub use incidence::Incidence;
pub use index_vec::{Idx, IndexVec};
pub use maximal::construct_maximal_net;
pub use rule::{Closure, FireError, FiringRule, TAU};
pub use state::NetState;
pub use structure::{
    Clock, Marking, Place, TimeBound, TimeInterval, TimeMarking, Transition, Weight,
};
