//! CLI integration tests
//!
//! Tests for the sqlmapper command-line interface.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn sqlmapper() -> Command {
    Command::cargo_bin("sqlmapper").unwrap()
}

const USER_MAPPER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE mapper PUBLIC "-//mybatis.org//DTD Mapper 3.0//EN" "https://mybatis.org/dtd/mybatis-3-mapper.dtd">
<mapper namespace="app.UserMapper">
  <select id="get">select <include refid="app.Shared.cols"/> from ${schema}.users where id = #{id}</select>
  <insert id="add">
    <selectKey keyProperty="id" order="BEFORE">select nextval('users_seq')</selectKey>
    insert into users (id) values (#{id})
  </insert>
</mapper>
"#;

const SHARED_MAPPER: &str = r#"<mapper namespace="app.Shared">
  <sql id="cols">id, name</sql>
</mapper>
"#;

/// Write both mappers into a temp dir, the user mapper first
fn mapper_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a_users.xml"), USER_MAPPER).unwrap();
    fs::write(temp.path().join("b_shared.xml"), SHARED_MAPPER).unwrap();
    temp
}

mod compile_command {
    use super::*;

    #[test]
    fn compile_directory_prints_statements() {
        let temp = mapper_dir();

        sqlmapper()
            .arg("compile")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("app.UserMapper.get [SELECT]"))
            .stdout(predicate::str::contains("probe app.UserMapper.add!selectKey (before)"))
            .stdout(predicate::str::contains("app.UserMapper.add!selectKey [SELECT]"));
    }

    #[test]
    fn compile_ignores_non_xml_files() {
        let temp = mapper_dir();
        fs::write(temp.path().join("notes.txt"), "not a mapper").unwrap();

        sqlmapper().arg("compile").arg(temp.path()).assert().success();
    }

    #[test]
    fn statement_text_keeps_unresolved_placeholders_dynamic() {
        let temp = mapper_dir();

        sqlmapper()
            .arg("compile")
            .arg("--var")
            .arg("schema=app")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("dynamic: select id, name from ${schema}.users"));
    }

    #[test]
    fn database_id_selects_variant() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("m.xml");
        fs::write(
            &file,
            r#"<mapper namespace="m"><select id="now" databaseId="mysql">select now()</select><select id="now">select current_timestamp</select></mapper>"#,
        )
        .unwrap();

        sqlmapper()
            .args(["compile", "--database-id", "mysql"])
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("databaseId=mysql"))
            .stdout(predicate::str::contains("select now()"));

        sqlmapper()
            .arg("compile")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("select current_timestamp"));
    }

    #[test]
    fn invalid_variable_flag_is_rejected() {
        let temp = mapper_dir();

        sqlmapper()
            .args(["compile", "--var", "schema"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("NAME=VALUE"));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn check_reports_count() {
        let temp = mapper_dir();

        sqlmapper()
            .arg("check")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("3 statements compiled from 2 mappers"));
    }

    #[test]
    fn check_fails_on_unresolved_fragment() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("users.xml");
        fs::write(&file, USER_MAPPER).unwrap();

        sqlmapper()
            .arg("check")
            .arg(&file)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("app.Shared.cols"));
    }

    #[test]
    fn check_reports_xml_errors_with_location() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("broken.xml");
        fs::write(&file, "<mapper namespace=\"m\">\n  <select id=\"a\">select 1</insert>\n</mapper>\n").unwrap();

        sqlmapper()
            .arg("check")
            .arg(&file)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("broken.xml"))
            .stderr(predicate::str::contains("XML error at line"));
    }

    #[test]
    fn check_fails_when_nothing_found() {
        let temp = TempDir::new().unwrap();

        sqlmapper()
            .arg("check")
            .arg(temp.path())
            .assert()
            .code(2)
            .stderr(predicate::str::contains("no mapper files found"));
    }

    #[test]
    fn missing_arguments_fail() {
        sqlmapper().arg("check").assert().failure();
    }
}
