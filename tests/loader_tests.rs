//! Batch loading tests for sqlmapper
//!
//! Mappers in a batch may reference fragments from mappers that come later.
//! Such statements are deferred and retried until no more progress is made.

use sqlmapper::cli::render_statement;
use sqlmapper::scripting::SqlSource;
use sqlmapper::{load, Configuration, Error, MapperLoader};

const USERS: &str = r#"<mapper namespace="app.UserMapper">
  <select id="all">select <include refid="app.Shared.cols"/> from users</select>
</mapper>"#;

const SHARED: &str = r#"<mapper namespace="app.Shared">
  <sql id="cols">id, <include refid="app.Audit.cols"/></sql>
</mapper>"#;

const AUDIT: &str = r#"<mapper namespace="app.Audit">
  <sql id="cols">created_at</sql>
</mapper>"#;

fn sql_of(registry: &sqlmapper::Registry, id: &str) -> String {
    match &registry.statement(id).expect("statement registered").sql_source {
        SqlSource::Static(sql) => sql.sql.clone(),
        other => panic!("expected static SQL, got {other:?}"),
    }
}

mod forward_references {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fragment_registered_later_resolves_at_finish() {
        let mut loader = MapperLoader::new(Configuration::new());
        loader.add_mapper("UserMapper.xml", USERS).unwrap();
        assert_eq!(loader.pending(), 1);
        loader.add_mapper("Shared.xml", SHARED).unwrap();
        loader.add_mapper("Audit.xml", AUDIT).unwrap();

        let registry = loader.finish().unwrap();
        assert_eq!(sql_of(&registry, "app.UserMapper.all"), "select id, created_at from users");
    }

    #[test]
    fn load_order_does_not_matter() {
        let orders = [
            [("u", USERS), ("s", SHARED), ("a", AUDIT)],
            [("a", AUDIT), ("s", SHARED), ("u", USERS)],
            [("s", SHARED), ("u", USERS), ("a", AUDIT)],
        ];
        for order in orders {
            let registry = load(Configuration::new(), order).unwrap();
            assert_eq!(sql_of(&registry, "app.UserMapper.all"), "select id, created_at from users");
        }
    }

    #[test]
    fn deferred_statements_retry_in_dependency_chains() {
        // The first two statements wait on fragments from mappers loaded after them
        let first = r#"<mapper namespace="a"><sql id="x">1</sql><select id="s">select <include refid="b.y"/></select></mapper>"#;
        let second = r#"<mapper namespace="b"><sql id="y">2</sql><select id="s">select <include refid="c.z"/></select></mapper>"#;
        let third = r#"<mapper namespace="c"><sql id="z">3</sql><select id="s">select <include refid="a.x"/></select></mapper>"#;

        let registry = load(Configuration::new(), [("1", first), ("2", second), ("3", third)]).unwrap();
        assert_eq!(sql_of(&registry, "a.s"), "select 2");
        assert_eq!(sql_of(&registry, "b.s"), "select 3");
        assert_eq!(sql_of(&registry, "c.s"), "select 1");
    }

    #[test]
    fn missing_fragment_is_terminal_after_fixpoint() {
        let err = load(Configuration::new(), [("UserMapper.xml", USERS), ("Shared.xml", SHARED)])
            .unwrap_err();
        match err {
            Error::Unresolved { failures } => {
                assert_eq!(failures.len(), 1);
                let message = failures[0].to_string();
                assert!(message.contains("app.UserMapper.all"), "{message}");
                assert!(message.contains("app.Audit.cols"), "{message}");
            }
            other => panic!("expected unresolved statements, got {other:?}"),
        }
    }

    const DIALECT_USERS: &str = r#"<mapper namespace="app.U">
  <select id="get" databaseId="mysql">select <include refid="app.S.cols"/> from t</select>
  <select id="get">select 'generic'</select>
  <insert id="add" databaseId="mysql">insert into t (<include refid="app.S.cols"/>) values (#{id})</insert>
  <insert id="add"><selectKey keyProperty="id" order="BEFORE">select 1</selectKey>insert into t (id) values (#{id})</insert>
</mapper>"#;

    const DIALECT_SHARED: &str = r#"<mapper namespace="app.S"><sql id="cols">id</sql></mapper>"#;

    #[test]
    fn deferred_dialect_variant_wins_in_any_order() {
        let orders = [
            [("u", DIALECT_USERS), ("s", DIALECT_SHARED)],
            [("s", DIALECT_SHARED), ("u", DIALECT_USERS)],
        ];
        for order in orders {
            let registry = load(Configuration::new().with_database_id("mysql"), order).unwrap();

            let get = registry.statement("app.U.get").unwrap();
            assert_eq!(get.database_id.as_deref(), Some("mysql"));
            assert_eq!(sql_of(&registry, "app.U.get"), "select id from t");
            assert_eq!(sql_of(&registry, "app.U.add"), "insert into t (id) values (?)");
        }
    }

    #[test]
    fn replaced_untagged_variant_leaves_no_key_probe() {
        let registry = load(
            Configuration::new().with_database_id("mysql"),
            [("u", DIALECT_USERS), ("s", DIALECT_SHARED)],
        )
        .unwrap();

        let add = registry.statement("app.U.add").unwrap();
        assert_eq!(add.key_generator, sqlmapper::KeyGeneratorStrategy::None);
        assert!(registry.statement("app.U.add!selectKey").is_none());
        assert!(registry.key_generator("app.U.add!selectKey").is_none());
        assert_eq!(registry.statements().count(), 2);
    }

    #[test]
    fn fatal_errors_abort_immediately() {
        let broken = r#"<mapper namespace="app.Broken"><select id="s"><include refid="t"><property name="a" value="1"/><property name="a" value="2"/></include></select><sql id="t">${a}</sql></mapper>"#;
        let err = load(Configuration::new(), [("Broken.xml", broken)]).unwrap_err();
        assert!(err.to_string().contains("defined twice"), "{err}");
    }
}

mod registration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failed_statement_registers_nothing() {
        let first = r#"<mapper namespace="app.M"><insert id="add">insert into t values (1)</insert></mapper>"#;
        let second = r#"<mapper namespace="app.M"><insert id="add"><selectKey keyProperty="id">select 1</selectKey>insert into t values (2)</insert></mapper>"#;

        let mut loader = MapperLoader::new(Configuration::new());
        loader.add_mapper("first.xml", first).unwrap();
        let err = loader.add_mapper("second.xml", second).unwrap_err();

        assert!(matches!(err, Error::DuplicateStatement { id } if id == "app.M.add"));
        assert!(!loader.registry().has_statement("app.M.add!selectKey"));
        assert!(loader.registry().key_generator("app.M.add!selectKey").is_none());
        assert_eq!(loader.registry().statement("app.M.add").unwrap().resource, "first.xml");
    }

    #[test]
    fn duplicate_fragments_are_rejected() {
        let mapper = r#"<mapper namespace="app.M"><sql id="a">1</sql><sql id="a">2</sql></mapper>"#;
        let err = load(Configuration::new(), [("m.xml", mapper)]).unwrap_err();
        assert!(matches!(err, Error::DuplicateFragment { id } if id == "app.M.a"));
    }

    #[test]
    fn mapper_requires_namespace_and_root() {
        let err = load(Configuration::new(), [("m.xml", "<mapper><select id=\"a\">1</select></mapper>")])
            .unwrap_err();
        assert!(matches!(err, Error::MissingNamespace));

        let err = load(Configuration::new(), [("m.xml", "<configuration/>")]).unwrap_err();
        assert!(matches!(err, Error::XmlError { .. }));
    }

    #[test]
    fn statements_keep_registration_order() {
        let mapper = r#"<mapper namespace="n">
            <select id="b">select <include refid="late"/></select>
            <select id="a">select 1</select>
            <sql id="late">2</sql>
        </mapper>"#;
        let registry = load(Configuration::new(), [("m.xml", mapper)]).unwrap();
        let ids: Vec<&str> = registry.statements().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["n.b", "n.a"]);
    }
}

mod rendering {
    use super::*;

    #[test]
    fn compiled_statements_render_as_summary() {
        let mapper = r#"<mapper namespace="app.UserMapper">
  <sql id="cols">id, name</sql>
  <select id="get" resultType="User">select <include refid="cols"/> from users where id = #{id}</select>
  <insert id="add" useGeneratedKeys="true">insert into users (name) values (#{name})</insert>
  <select id="find">select * from users <where><if test="name != null">name = #{name}</if></where></select>
</mapper>"#;
        let registry = load(Configuration::new(), [("UserMapper.xml", mapper)]).unwrap();
        let rendered: String = registry.statements().map(render_statement).collect();

        insta::assert_snapshot!(rendered.trim_end(), @r#"
        app.UserMapper.get [SELECT] key=none
          sql: select id, name from users where id = ?
          parameters: id
        app.UserMapper.add [INSERT] key=auto-generated
          sql: insert into users (name) values (?)
          parameters: name
        app.UserMapper.find [SELECT] key=none
          dynamic: select * from users <where><if test="name != null">name = #{name}</if></where>
        "#);
    }
}
