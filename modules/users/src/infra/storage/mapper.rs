use crate::contract::model::{Role, User};
use crate::infra::storage::entity::Model as UserEntity;

/// Convert a database entity to a contract model (password hash stays behind)
pub fn entity_to_contract(entity: UserEntity) -> User {
    User {
        id: entity.id,
        registration_number: entity.registration_number,
        email: entity.email,
        name: entity.name,
        role: Role::parse(&entity.role).unwrap_or_default(),
        is_verified: entity.is_verified,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}
