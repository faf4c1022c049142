mod user_dto;

pub use user_dto::{
    RegisterUserDto, RoleGrantDto, UpdateRolesDto, UpdateUserDto, UserFilterQuery,
    UserResponseDto, UserRoleDto,
};
